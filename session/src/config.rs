use std::str::FromStr;

/// Host loop configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tick_rate_hz: u32,
    pub broadcast_rate_hz: u32,
    pub rng_seed: u64,
    /// Lane slots that get an imitation opponent
    pub imitation_slots: Vec<i32>,
    /// Stop after this many seconds; run until Ctrl-C when None
    pub run_seconds: Option<f64>,
    /// glTF scene holding the lane prototypes; built-in prototypes when None
    pub scene_path: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            broadcast_rate_hz: 10,
            rng_seed: 42,
            imitation_slots: vec![-1, 1],
            run_seconds: None,
            scene_path: None,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, String> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{} has an invalid value: {:?}", key, value)),
        Err(_) => Ok(None),
    }
}

impl SessionConfig {
    /// Defaults overridden by `BOWLING_*` environment variables.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();
        if let Some(v) = env_parse("BOWLING_TICK_RATE_HZ")? {
            config.tick_rate_hz = v;
        }
        if let Some(v) = env_parse("BOWLING_BROADCAST_RATE_HZ")? {
            config.broadcast_rate_hz = v;
        }
        if let Some(v) = env_parse("BOWLING_RNG_SEED")? {
            config.rng_seed = v;
        }
        if let Some(v) = env_parse("BOWLING_RUN_SECONDS")? {
            config.run_seconds = Some(v);
        }
        if let Ok(slots) = std::env::var("BOWLING_IMITATION_SLOTS") {
            config.imitation_slots = parse_slots(&slots)?;
        }
        if let Ok(path) = std::env::var("BOWLING_SCENE") {
            config.scene_path = Some(path);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate_hz == 0 {
            return Err("tick_rate_hz must be > 0".to_string());
        }
        if self.broadcast_rate_hz == 0 || self.broadcast_rate_hz > self.tick_rate_hz {
            return Err("broadcast_rate_hz must be in 1..=tick_rate_hz".to_string());
        }
        if self.imitation_slots.contains(&0) {
            return Err("slot 0 belongs to the local player".to_string());
        }
        let mut slots = self.imitation_slots.clone();
        slots.sort_unstable();
        slots.dedup();
        if slots.len() != self.imitation_slots.len() {
            return Err("imitation_slots must not repeat".to_string());
        }
        if let Some(seconds) = self.run_seconds {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err("run_seconds must be finite and > 0".to_string());
            }
        }
        Ok(())
    }
}

/// Comma separated slot list, e.g. `-2,-1,1`. Empty means no imitations.
fn parse_slots(text: &str) -> Result<Vec<i32>, String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| format!("BOWLING_IMITATION_SLOTS has an invalid slot: {:?}", s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_config_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn broadcast_faster_than_tick_invalid() {
        let config = SessionConfig {
            tick_rate_hz: 30,
            broadcast_rate_hz: 60,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn imitation_on_local_slot_invalid() {
        let config = SessionConfig {
            imitation_slots: vec![-1, 0],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn repeated_slots_invalid() {
        let config = SessionConfig {
            imitation_slots: vec![1, 1],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn slot_list_parses() {
        assert_eq!(parse_slots("-2, -1,1").unwrap(), vec![-2, -1, 1]);
        assert_eq!(parse_slots("").unwrap(), Vec::<i32>::new());
        assert!(parse_slots("1,x").is_err());
    }
}
