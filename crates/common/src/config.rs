use std::env;

#[derive(Debug, Clone)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn from_env() -> Self {
        match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `development` or `production`.",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn environment_defaults_to_development() {
        unsafe { env::remove_var("ENVIRONMENT") };
        assert!(matches!(Environment::from_env(), Environment::Development));
    }

    #[test]
    #[serial]
    fn environment_reads_production_aliases() {
        unsafe { env::set_var("ENVIRONMENT", "prod") };
        assert!(matches!(Environment::from_env(), Environment::Production));
        unsafe { env::set_var("ENVIRONMENT", "PRODUCTION") };
        assert!(matches!(Environment::from_env(), Environment::Production));
        unsafe { env::remove_var("ENVIRONMENT") };
    }

    #[test]
    fn environment_try_from_rejects_unknown() {
        let err = Environment::try_from("staging".to_string()).unwrap_err();
        assert!(err.contains("staging"));
    }
}
