use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::AppError;

// Default configuration constants
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ENV: &str = "dev";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_USERNAME: &str = "NDWAdminASA";
pub const DEFAULT_TABLE: &str = "[dbo].[PropertyExport]";
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;
/// Sessions untouched for this long are dropped with their table copy.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(8 * 60 * 60);

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

/// Connection settings for the warehouse, resolved from `SYNAPSE_*` variables.
#[derive(Clone)]
pub struct DatabaseSettings {
    pub env: String,
    pub server: String,
    pub port: u16,
    pub username: String,
    pub database: String,
    pub password: Option<String>,
    pub table: TableName,
}

impl DatabaseSettings {
    pub fn from_env() -> Result<Self, AppError> {
        let env_name = non_empty_var("SYNAPSE_ENV").unwrap_or_else(|| DEFAULT_ENV.to_string());
        let server = non_empty_var("SYNAPSE_SERVER")
            .unwrap_or_else(|| format!("weu-ndw-{}-asa.sql.azuresynapse.net", env_name));
        let port = match non_empty_var("SYNAPSE_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                AppError::InvalidConfiguration(format!("SYNAPSE_PORT is not a valid port: {}", raw))
            })?,
            None => DEFAULT_DB_PORT,
        };
        let username =
            non_empty_var("SYNAPSE_USERNAME").unwrap_or_else(|| DEFAULT_DB_USERNAME.to_string());
        let database =
            non_empty_var("SYNAPSE_DATABASE").unwrap_or_else(|| format!("weu_ndw_{}", env_name));
        let password = non_empty_var("SYNAPSE_PASSWORD");
        let table_raw = non_empty_var("SYNAPSE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string());
        let table = TableName::parse(&table_raw)?;
        Ok(Self {
            env: env_name,
            server,
            port,
            username,
            database,
            password,
            table,
        })
    }
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("env", &self.env)
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("database", &self.database)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("table", &self.table.display())
            .finish()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// A validated, optionally schema-qualified table identifier.
///
/// Accepts `name`, `schema.name` and the bracketed `[schema].[name]` spelling. Every
/// part must match `[A-Za-z_][A-Za-z0-9_]*`, so quoting never has to escape anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableName {
    schema: Option<String>,
    name: String,
    display: String,
}

impl TableName {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        let parts: Vec<&str> = trimmed.split('.').collect();
        let invalid = || AppError::InvalidConfiguration(format!("invalid table name: {}", raw));
        let (schema, name) = match parts.as_slice() {
            [name] => (None, unbracket(name).ok_or_else(invalid)?),
            [schema, name] => (
                Some(unbracket(schema).ok_or_else(invalid)?),
                unbracket(name).ok_or_else(invalid)?,
            ),
            _ => return Err(invalid()),
        };
        Ok(Self {
            schema,
            name,
            display: trimmed.to_string(),
        })
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The table name as it was configured, used in user-facing messages.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Quoted identifier ready to be placed into SQL text.
    pub fn quoted(&self) -> String {
        match &self.schema {
            Some(schema) => format!("\"{}\".\"{}\"", schema, self.name),
            None => format!("\"{}\"", self.name),
        }
    }
}

fn unbracket(part: &str) -> Option<String> {
    let part = part.trim();
    let inner = match (part.strip_prefix('['), part.ends_with(']')) {
        (Some(rest), true) => &rest[..rest.len() - 1],
        (None, false) => part,
        _ => return None,
    };
    if is_identifier(inner) {
        Some(inner.to_string())
    } else {
        None
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
