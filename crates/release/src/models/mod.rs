/// Serialize a label enum as its `as_str()` form, and deserialize it
/// leniently: older databases stored `null`, booleans or labels that no
/// longer exist, all of which read back as `Unknown`.
macro_rules! label_serde {
    ($label:ident) => {
        impl serde::Serialize for $label {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $label {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                #[derive(serde::Deserialize)]
                #[serde(untagged)]
                enum Stored {
                    Label(String),
                    Other(serde::de::IgnoredAny),
                }
                Ok(match <Stored as serde::Deserialize>::deserialize(deserializer)? {
                    Stored::Label(label) => label.parse().unwrap_or($label::Unknown),
                    Stored::Other(_) => $label::Unknown,
                })
            }
        }
    };
}

mod arch;
mod asset;
mod channel;
mod graphics;
mod metadata;
mod platform;
mod release;
mod sounds;
mod timestamp;

pub use self::arch::Arch;
pub use self::asset::AssetRecord;
pub use self::channel::Channel;
pub use self::graphics::Graphics;
pub use self::metadata::{AssetMetadata, ReleaseMetadata};
pub use self::platform::Platform;
pub use self::release::ReleaseRecord;
pub use self::sounds::Sounds;

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace(['-', '_', ' '], "")
}
