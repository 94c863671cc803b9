use serde::{Deserialize, Serialize};

/// Wire format selector (§6 `serde.type`). `curve-serde` implements only
/// `Json` today; the field exists so configuration files from the wider
/// system validate without alteration if they name a format this crate
/// doesn't yet support — loading such a config simply keeps `Json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SerdeType {
    #[default]
    Json,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerdeConfig {
    #[serde(default, rename = "type")]
    pub kind: SerdeType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_json() {
        assert_eq!(SerdeConfig::default().kind, SerdeType::Json);
    }
}
