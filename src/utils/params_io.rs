use anyhow::Context;
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::{env, path::Path};

/// Get the command-line argument at position `pos`
pub fn take_from_args(pos: usize) -> Option<String> {
    env::args().nth(pos)
}

/// Environment source with `__` as the nesting separator.
///
/// Keys in `list_keys` are split on `,` into sequences; every other value stays
/// a scalar.
fn env_source(env_prefix: Option<&str>, list_keys: &[&str]) -> Environment {
    let mut env = match env_prefix {
        Some(prefix) => Environment::with_prefix(prefix),
        None => Environment::default(),
    }
    .separator("__")
    .try_parsing(true);

    if !list_keys.is_empty() {
        env = env.list_separator(",");
        for &key in list_keys {
            env = env.with_list_parse_key(key);
        }
    }
    env
}

/// Load a config from files merged with environment overrides.
///
/// Missing files are skipped. Environment variables are read with `env_prefix`
/// and `__` as the nesting separator, e.g. `ONEOF__VALUE_BOUND=64`. Without a
/// prefix every variable is a candidate key.
pub fn load_cfg_merge<T, P>(
    paths: impl IntoIterator<Item = P>,
    env_prefix: Option<&str>,
    list_keys: &[&str],
) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let mut builder = Config::builder();

    for p in paths {
        let pb = p.as_ref().to_path_buf();
        if pb.exists() {
            builder = builder.add_source(File::from(pb));
        } else {
            tracing::warn!("config loading: file {} does not exist", pb.display());
        }
    }

    builder = builder.add_source(env_source(env_prefix, list_keys));

    let cfg = builder
        .build()
        .context("failed to build configuration from provided sources")?;

    cfg.try_deserialize()
        .context("failed to deserialize merged configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
        #[serde(default)]
        count: u32,
    }

    #[test]
    fn merges_existing_files_and_skips_missing() {
        let dir = env::temp_dir().join(format!("oneof-params-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, r#"{{ "name": "fanout", "count": 3 }}"#).unwrap();

        let cfg: Sample = load_cfg_merge(
            [path.clone(), dir.join("missing.json")],
            Some("ONEOF_PARAMS_TEST_UNUSED"),
            &[],
        )
        .unwrap();
        assert_eq!(cfg.name, "fanout");
        assert_eq!(cfg.count, 3);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[derive(Debug, Deserialize)]
    struct Lists {
        sizes: Vec<usize>,
        tag: String,
    }

    fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn env_list_keys_are_split_and_others_kept_whole() {
        let env = env_source(Some("ONEOF_T"), &["sizes"]).source(Some(vars(&[
            ("ONEOF_T__SIZES", "3,17,20"),
            ("ONEOF_T__TAG", "a,b"),
            ("OTHER__TAG", "ignored"),
        ])));
        let cfg: Lists = Config::builder()
            .add_source(env)
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.sizes, vec![3, 17, 20]);
        assert_eq!(cfg.tag, "a,b");
    }

    #[test]
    fn env_without_prefix_reads_every_variable() {
        let env = env_source(None, &[]).source(Some(vars(&[("TAG", "plain"), ("SIZES", "4")])));
        let cfg: Config = Config::builder().add_source(env).build().unwrap();
        assert_eq!(cfg.get_string("tag").unwrap(), "plain");
        assert_eq!(cfg.get_int("sizes").unwrap(), 4);
    }
}
