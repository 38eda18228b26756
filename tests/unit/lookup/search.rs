use async_trait::async_trait;
use chrono::NaiveDate;

use super::*;
use crate::assets::color::Color;
use crate::foundation::core::CropArea;
use crate::lookup::service::{EquipmentPayload, Identifier};

struct OneCharacter;

#[async_trait]
impl CharacterLookupService for OneCharacter {
    async fn resolve_identifier(&self, name: &str) -> MapleResult<Identifier> {
        if name == "Lumi" {
            Ok(Identifier("ocid-1".into()))
        } else {
            Err(MapleError::not_found(name.to_owned()))
        }
    }

    async fn appearance(&self, _id: &Identifier, _date: Option<NaiveDate>) -> MapleResult<AppearanceInfo> {
        Ok(AppearanceInfo {
            display_name: "Lumi".into(),
            guild_name: Some("Dawn".into()),
            image_url: "https://img/look/1".into(),
        })
    }

    async fn equipment_state(
        &self,
        _id: &Identifier,
        _date: Option<NaiveDate>,
    ) -> MapleResult<EquipmentPayload> {
        Ok(serde_json::Value::Null)
    }
}

#[tokio::test]
async fn search_builds_default_appearance() {
    let a = search_character(&OneCharacter, "  Lumi ", &Pose::with_emotion("E02"))
        .await
        .unwrap();
    assert_eq!(a.name, "Lumi");
    assert_eq!(
        a.image,
        ImageSource::Url(
            "https://img/look/1?action=A00&emotion=E02&wmotion=W00&width=300&height=400".into()
        )
    );
    assert_eq!(a.crop, CropArea::DEFAULT_FACE);
    assert!(a.show_name);
    assert_eq!(a.background, Color::WHITE);
    assert_eq!(a.guild.as_deref(), Some("Dawn"));
}

#[tokio::test]
async fn search_propagates_not_found_and_rejects_blank() {
    assert!(matches!(
        search_character(&OneCharacter, "Nobody", &Pose::default()).await,
        Err(MapleError::NotFound(_))
    ));
    assert!(matches!(
        search_character(&OneCharacter, "   ", &Pose::default()).await,
        Err(MapleError::Validation(_))
    ));
}
