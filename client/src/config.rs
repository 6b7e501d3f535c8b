use hatvenn_shared::Cursor;

pub const INITIAL_BACKOFF_MS: u32 = 100;
pub const MAX_BACKOFF_MS: u32 = 10_000;
/// Success-path re-poll delay is drawn from `[0, JITTER_WINDOW_MS)`.
pub const JITTER_WINDOW_MS: u32 = 250;

pub const CHAT_HISTORY_LEN: usize = 4;
pub const NAME_STORAGE_KEY: &str = "name";

pub const MOUNT_ELEMENT_ID: &str = "puzz";
pub const DEFAULT_WAIT_PATH: &str = "/hatwait";
pub const DEFAULT_PLACE_PATH: &str = "/hatplace";
pub const DEFAULT_SUBMIT_PATH: &str = "/hatsubmit";

/// Per-page settings, read once from the mount element's `data-*` attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub wid: u64,
    pub wait_path: String,
    pub place_path: String,
    pub submit_path: String,
    pub initial_cursor: Cursor,
}

impl ClientConfig {
    /// `attr` looks up a `data-*` attribute by its full name.
    pub fn from_attributes(attr: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let wid = attr("data-wid")
            .ok_or("missing data-wid attribute")?
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("invalid data-wid: {e}"))?;

        let path = |name: &str, default: &str| {
            attr(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            wid,
            wait_path: path("data-wait-path", DEFAULT_WAIT_PATH),
            place_path: path("data-place-path", DEFAULT_PLACE_PATH),
            submit_path: path("data-submit-path", DEFAULT_SUBMIT_PATH),
            initial_cursor: attr("data-cursor")
                .and_then(|value| value.trim().parse::<Cursor>().ok())
                .unwrap_or(0),
        })
    }

    pub fn from_element(element: &web_sys::Element) -> Result<Self, String> {
        Self::from_attributes(|name| element.get_attribute(name))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ClientConfig, String> {
        let attrs: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_attributes(|name| attrs.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_wid_is_set() {
        let config = config_from(&[("data-wid", "17")]).expect("valid config");
        assert_eq!(config.wid, 17);
        assert_eq!(config.wait_path, DEFAULT_WAIT_PATH);
        assert_eq!(config.place_path, DEFAULT_PLACE_PATH);
        assert_eq!(config.submit_path, DEFAULT_SUBMIT_PATH);
        assert_eq!(config.initial_cursor, 0);
    }

    #[test]
    fn overrides_are_trimmed_and_blank_values_ignored() {
        let config = config_from(&[
            ("data-wid", " 3 "),
            ("data-wait-path", " /wait "),
            ("data-place-path", "   "),
            ("data-cursor", "41"),
        ])
        .expect("valid config");
        assert_eq!(config.wid, 3);
        assert_eq!(config.wait_path, "/wait");
        assert_eq!(config.place_path, DEFAULT_PLACE_PATH);
        assert_eq!(config.initial_cursor, 41);
    }

    #[test]
    fn missing_or_bad_wid_is_an_error() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("data-wid", "w3")]).is_err());
    }
}
