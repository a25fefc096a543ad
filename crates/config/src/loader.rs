//! Locate, read and parse the configuration file.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{Config, Error};

/// Default configuration location: `~/.dockpeek/config.ron`.
pub fn default_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|h| PathBuf::from(h).join(".dockpeek").join("config.ron"))
}

/// Parse and validate configuration text.
pub fn parse_str(source: &str) -> Result<Config, Error> {
    let cfg: Config = ron::from_str(source).map_err(|e| Error::Parse {
        path: None,
        line: e.span.start.line,
        col: e.span.start.col,
        message: e.code.to_string(),
    })?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load and validate a configuration file at `path`.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    parse_str(&text).map_err(|e| e.with_path(path))
}

/// Load from `explicit` when given (a missing file is an error), otherwise from
/// the default location (a missing file yields the defaults).
pub fn load_or_default(explicit: Option<&Path>) -> Result<Config, Error> {
    if let Some(p) = explicit {
        return load_from_path(p);
    }
    let Some(p) = default_path() else {
        debug!("config_no_home_using_defaults");
        return Ok(Config::default());
    };
    match fs::metadata(&p) {
        Ok(_) => load_from_path(&p),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %p.display(), "config_absent_using_defaults");
            Ok(Config::default())
        }
        Err(e) => Err(Error::Read {
            path: Some(p),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        process,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;
    use crate::OverlapPolicy;

    fn temp_file(name: &str, body: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = env::temp_dir().join(format!("dockpeek-config-{}-{}", process::id(), nanos));
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join(name);
        fs::write(&p, body).unwrap();
        p
    }

    #[test]
    fn empty_struct_is_all_defaults() {
        let cfg = parse_str("()").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.jitter_threshold, 5.0);
        assert_eq!(cfg.overlap, OverlapPolicy::Drop);
    }

    #[test]
    fn partial_overrides() {
        let cfg = parse_str("(jitter_threshold: 2.5, overlap: QueueLatest, preview: (width: 400.0))")
            .unwrap();
        assert_eq!(cfg.jitter_threshold, 2.5);
        assert_eq!(cfg.overlap, OverlapPolicy::QueueLatest);
        assert_eq!(cfg.preview.width, 400.0);
        assert_eq!(cfg.preview.height, 200.0);
        assert_eq!(cfg.dock_bundle_id, "com.apple.dock");
    }

    #[test]
    fn parse_error_has_location() {
        let err = parse_str("(\n  jitter_threshold: nope,\n)").unwrap_err();
        match err {
            Error::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(matches!(
            parse_str("(jitter: 1.0)"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn validation_catches_bad_values() {
        assert!(matches!(
            parse_str("(jitter_threshold: -1.0)"),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            parse_str("(dock_bundle_id: \"  \")"),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            parse_str("(preview: (height: 0.0))"),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn load_attaches_path() {
        let p = temp_file("bad.ron", "(jitter_threshold: -3.0)");
        let err = load_from_path(&p).unwrap_err();
        assert_eq!(err.path(), Some(p.as_path()));
        assert!(err.pretty().contains("validation"));
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let p = env::temp_dir().join("dockpeek-definitely-missing.ron");
        assert!(matches!(
            load_or_default(Some(&p)),
            Err(Error::Read { .. })
        ));
    }

    #[test]
    fn dump_round_trips() {
        let cfg = Config {
            jitter_threshold: 7.0,
            ..Config::default()
        };
        let back = parse_str(&cfg.to_ron()).unwrap();
        assert_eq!(back, cfg);
    }
}
