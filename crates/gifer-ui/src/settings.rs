// crates/gifer-ui/src/settings.rs
//
// Startup configuration, read once from the environment.
//
//   GIFER_FFMPEG_EXE   explicit ffmpeg executable, skips the lookup
//   GIFER_NO_DOWNLOAD  any non-empty value turns the download helper off
//   GIFER_LOG          error | warn | info | debug | trace | off

use std::path::PathBuf;

use log::LevelFilter;

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub ffmpeg_override: Option<PathBuf>,
    pub allow_download:  bool,
    pub log_level:       LevelFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ffmpeg_override: None,
            allow_download:  true,
            log_level:       LevelFilter::Info,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup so tests don't touch the process env.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let set = |key: &str| get(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let log_level = match set("GIFER_LOG") {
            Some(v) => v.parse().unwrap_or_else(|_| {
                eprintln!("[settings] unknown GIFER_LOG level {v:?}, using info");
                LevelFilter::Info
            }),
            None => LevelFilter::Info,
        };

        Self {
            ffmpeg_override: set("GIFER_FFMPEG_EXE").map(PathBuf::from),
            allow_download:  set("GIFER_NO_DOWNLOAD").is_none(),
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = pairs.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_vars(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(from(&[]), Settings::default());
    }

    #[test]
    fn override_and_no_download() {
        let s = from(&[("GIFER_FFMPEG_EXE", "/opt/ffmpeg"), ("GIFER_NO_DOWNLOAD", "1")]);
        assert_eq!(s.ffmpeg_override, Some(PathBuf::from("/opt/ffmpeg")));
        assert!(!s.allow_download);
    }

    #[test]
    fn blank_values_are_ignored() {
        let s = from(&[("GIFER_FFMPEG_EXE", "  "), ("GIFER_NO_DOWNLOAD", "")]);
        assert_eq!(s.ffmpeg_override, None);
        assert!(s.allow_download);
    }

    #[test]
    fn log_level_is_case_insensitive() {
        assert_eq!(from(&[("GIFER_LOG", "DEBUG")]).log_level, LevelFilter::Debug);
        assert_eq!(from(&[("GIFER_LOG", "off")]).log_level, LevelFilter::Off);
        assert_eq!(from(&[("GIFER_LOG", "loud")]).log_level, LevelFilter::Info);
    }
}
