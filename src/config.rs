use std::collections::HashMap;

use crate::timer::{TimerConfig, DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES};

pub const CONF_FILE_NAME: &str = "pomotimer.ini";
const CONF_SECTION: &str = "pomotimer";

// Configuration validation constants
const MIN_MINUTES: u32 = 1;
const MAX_MINUTES: u32 = 600;                 // 10 hours

type IniMap = HashMap<String, HashMap<String, Option<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
  pub timer: TimerConfig,
  pub notifications: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self { timer: TimerConfig::default(), notifications: true }
  }
}

/// Parse and validate a minutes configuration value
fn parse_minutes_config(value: &str, config_name: &str, default: u32) -> u32 {
  match value.trim().parse::<u32>() {
    Ok(minutes) if (MIN_MINUTES..=MAX_MINUTES).contains(&minutes) => minutes,
    Ok(minutes) => {
      warn!("Config value '{}' = {} is out of valid range [{}, {}], using default {}",
            config_name, minutes, MIN_MINUTES, MAX_MINUTES, default);
      eprintln!("Warning: {} value {} out of range, using default {}", config_name, minutes, default);
      default
    }
    Err(e) => {
      warn!("Failed to parse config value '{}' = '{}': {}, using default {}",
            config_name, value, e, default);
      eprintln!("Warning: Invalid {} value '{}', using default {}", config_name, value, default);
      default
    }
  }
}

fn parse_bool_config(value: &str, config_name: &str, default: bool) -> bool {
  match value.trim().to_ascii_lowercase().as_str() {
    "true" | "yes" | "on" | "1" => true,
    "false" | "no" | "off" | "0" => false,
    _ => {
      warn!("Failed to parse config value '{}' = '{}', using default {}", config_name, value, default);
      eprintln!("Warning: Invalid {} value '{}', using default {}", config_name, value, default);
      default
    }
  }
}

/// Loads startup settings, falling back to defaults for anything missing or bad.
pub fn load(path: &str) -> Settings {
  info!("Reading config from {}", path);
  let inimap: IniMap = match ini!(safe path) {
    Ok(map) => map,
    Err(error) => {
      eprintln!("Warning: Couldn't load config file '{}': {}", path, error);
      eprintln!("Continuing with default values.");
      info!("Using default configuration");
      HashMap::new()
    }
  };
  from_map(&inimap)
}

fn from_map(inimap: &IniMap) -> Settings {
  for (key, value) in inimap {
    info!("{} / {:?}", key, value);
  }

  let mut settings = Settings::default();
  let Some(section) = inimap.get(CONF_SECTION) else {
    return settings;
  };

  if let Some(val) = section.get("workminutes").and_then(|v| v.as_ref()) {
    settings.timer.work_minutes = parse_minutes_config(val, "workminutes", DEFAULT_WORK_MINUTES);
    info!("Set work_minutes to: {}", settings.timer.work_minutes);
  }

  if let Some(val) = section.get("breakminutes").and_then(|v| v.as_ref()) {
    settings.timer.break_minutes = parse_minutes_config(val, "breakminutes", DEFAULT_BREAK_MINUTES);
    info!("Set break_minutes to: {}", settings.timer.break_minutes);
  }

  if let Some(val) = section.get("notifications").and_then(|v| v.as_ref()) {
    settings.notifications = parse_bool_config(val, "notifications", true);
    info!("Set notifications to: {}", settings.notifications);
  }

  settings
}

#[cfg(test)]
mod tests {
  use super::*;

  fn section(pairs: &[(&str, &str)]) -> IniMap {
    let values = pairs.iter()
      .map(|(k, v)| (k.to_string(), Some(v.to_string())))
      .collect();
    HashMap::from([(CONF_SECTION.to_string(), values)])
  }

  #[test]
  fn test_parse_minutes_config_valid() {
    assert_eq!(parse_minutes_config("45", "test", DEFAULT_WORK_MINUTES), 45);
  }

  #[test]
  fn test_parse_minutes_config_zero() {
    assert_eq!(parse_minutes_config("0", "test", DEFAULT_WORK_MINUTES), DEFAULT_WORK_MINUTES);
  }

  #[test]
  fn test_parse_minutes_config_too_high() {
    assert_eq!(parse_minutes_config("601", "test", DEFAULT_BREAK_MINUTES), DEFAULT_BREAK_MINUTES);
  }

  #[test]
  fn test_parse_minutes_config_invalid() {
    assert_eq!(parse_minutes_config("soon", "test", DEFAULT_WORK_MINUTES), DEFAULT_WORK_MINUTES);
    assert_eq!(parse_minutes_config("-3", "test", DEFAULT_WORK_MINUTES), DEFAULT_WORK_MINUTES);
  }

  #[test]
  fn test_parse_minutes_config_boundaries() {
    assert_eq!(parse_minutes_config("1", "test", DEFAULT_WORK_MINUTES), 1);
    assert_eq!(parse_minutes_config("600", "test", DEFAULT_WORK_MINUTES), 600);
  }

  #[test]
  fn test_parse_bool_config() {
    assert!(parse_bool_config("Yes", "test", false));
    assert!(!parse_bool_config("off", "test", true));
    assert!(parse_bool_config("maybe", "test", true));
  }

  #[test]
  fn test_from_map_empty() {
    assert_eq!(from_map(&HashMap::new()), Settings::default());
  }

  #[test]
  fn test_from_map_section() {
    let map = section(&[("workminutes", "50"), ("breakminutes", "10"), ("notifications", "false")]);
    let settings = from_map(&map);
    assert_eq!(settings.timer.work_minutes, 50);
    assert_eq!(settings.timer.break_minutes, 10);
    assert!(!settings.notifications);
  }

  #[test]
  fn test_from_map_bad_value_falls_back() {
    let map = section(&[("workminutes", "forever")]);
    let settings = from_map(&map);
    assert_eq!(settings.timer.work_minutes, DEFAULT_WORK_MINUTES);
    assert_eq!(settings.timer.break_minutes, DEFAULT_BREAK_MINUTES);
  }

  #[test]
  fn test_load_missing_file() {
    assert_eq!(load("does-not-exist.ini"), Settings::default());
  }
}
