use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x6d61_706c_6566_7270;

/// Top-level equipment field that changes every day regardless of content.
const VOLATILE_KEY: &str = "date";

/// Stable digest of an equipment payload.
///
/// Object key order does not matter; the top-level `date` field is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EquipmentFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl EquipmentFingerprint {
    /// 32 lowercase hex digits.
    pub fn to_hex(self) -> String {
        format!("{:016x}{:016x}", self.hi, self.lo)
    }
}

impl std::fmt::Display for EquipmentFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

impl serde::Serialize for EquipmentFingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Fingerprint an equipment payload.
pub fn fingerprint_equipment(payload: &serde_json::Value) -> EquipmentFingerprint {
    let mut h = StableHasher::new();
    match payload {
        serde_json::Value::Object(map) => {
            let mut keys = map
                .keys()
                .filter(|k| k.as_str() != VOLATILE_KEY)
                .collect::<Vec<_>>();
            keys.sort();
            h.write_u8(5);
            h.write_u64(keys.len() as u64);
            for k in keys {
                h.write_str(k);
                write_value(&mut h, &map[k.as_str()]);
            }
        }
        other => write_value(&mut h, other),
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> EquipmentFingerprint {
        let v = self.inner.digest128();
        EquipmentFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_value(h: &mut StableHasher, v: &serde_json::Value) {
    match v {
        serde_json::Value::Null => h.write_u8(0),
        serde_json::Value::Bool(x) => {
            h.write_u8(1);
            h.write_u8(u8::from(*x));
        }
        serde_json::Value::Number(n) => {
            h.write_u8(2);
            h.write_str(&n.to_string());
        }
        serde_json::Value::String(s) => {
            h.write_u8(3);
            h.write_str(s);
        }
        serde_json::Value::Array(items) => {
            h.write_u8(4);
            h.write_u64(items.len() as u64);
            for item in items {
                write_value(h, item);
            }
        }
        serde_json::Value::Object(map) => {
            h.write_u8(5);
            let mut keys = map.keys().collect::<Vec<_>>();
            keys.sort();
            h.write_u64(keys.len() as u64);
            for k in keys {
                h.write_str(k);
                write_value(h, &map[k.as_str()]);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/fingerprint.rs"]
mod tests;
