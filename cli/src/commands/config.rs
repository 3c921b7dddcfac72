use anyhow::Result;
use hfscout_core::Config;

pub async fn execute(key: Option<&str>, value: Option<&str>) -> Result<()> {
    let mut config = Config::load()?;

    match (key, value) {
        // Show all config
        (None, None) => {
            println!("Configuration file: {:?}\n", Config::config_path()?);
            println!("[hub]");
            for key in ["hub.endpoint", "hub.token", "hub.timeout_secs"] {
                println!("  {} = {}", short_key(key), get_config_value(&config, key)?);
            }
            println!();
            println!("[search]");
            for key in [
                "search.fetch_limit",
                "search.top_n",
                "search.sort",
                "search.throttle_ms",
                "search.deadline_secs",
            ] {
                println!("  {} = {}", short_key(key), get_config_value(&config, key)?);
            }
            println!();
            println!("[ranking]");
            println!(
                "  trusted_owners = {}",
                config
                    .ranking
                    .trusted_owners
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("  (edit the file to change ranking weights)");
        }

        // Get a specific key
        (Some(key), None) => {
            let value = get_config_value(&config, key)?;
            println!("{}", value);
        }

        // Set a specific key
        (Some(key), Some(value)) => {
            set_config_value(&mut config, key, value)?;
            config.save()?;
            println!("Set {} = {}", key, value);
        }

        _ => unreachable!(),
    }

    Ok(())
}

fn short_key(key: &str) -> &str {
    key.split_once('.').map(|(_, k)| k).unwrap_or(key)
}

fn get_config_value(config: &Config, key: &str) -> Result<String> {
    match key {
        "hub.endpoint" => Ok(config.hub.endpoint.clone()),
        "hub.token" => Ok(config
            .hub
            .token
            .as_ref()
            .map(|_| "***".to_string())
            .unwrap_or_else(|| "(not set)".to_string())),
        "hub.timeout_secs" => Ok(config.hub.timeout_secs.to_string()),
        "search.fetch_limit" => Ok(config.search.fetch_limit.to_string()),
        "search.top_n" => Ok(config.search.top_n.to_string()),
        "search.sort" => Ok(config.search.sort.to_string()),
        "search.throttle_ms" => Ok(config.search.throttle_ms.to_string()),
        "search.deadline_secs" => Ok(config
            .search
            .deadline_secs
            .map(|s| s.to_string())
            .unwrap_or_else(|| "(none)".to_string())),
        _ => anyhow::bail!("Unknown config key: {}", key),
    }
}

fn set_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "hub.endpoint" => config.hub.endpoint = value.to_string(),
        "hub.token" => {
            config.hub.token = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        }
        "hub.timeout_secs" => config.hub.timeout_secs = value.parse()?,
        "search.fetch_limit" => config.search.fetch_limit = value.parse()?,
        "search.top_n" => config.search.top_n = value.parse()?,
        "search.sort" => config.search.sort = value.parse().map_err(anyhow::Error::msg)?,
        "search.throttle_ms" => config.search.throttle_ms = value.parse()?,
        "search.deadline_secs" => {
            config.search.deadline_secs = if value.is_empty() {
                None
            } else {
                Some(value.parse()?)
            }
        }
        _ => anyhow::bail!("Unknown config key: {}", key),
    }
    Ok(())
}
