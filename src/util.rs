use std::fmt::{Display, Write};

use rand::{rngs::OsRng, RngCore};
use url::Url;

use crate::error::Result;

/// Prefix shared by every scratch database
pub const DATABASE_NAME_PREFIX: &str = "testing_db_";

/// A unique name for a scratch database
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Generate a new name from 8 bytes of operating system randomness
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; 8];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Self::from_bytes(bytes))
    }

    fn from_bytes(bytes: [u8; 8]) -> Self {
        let mut name = String::with_capacity(DATABASE_NAME_PREFIX.len() + 16);
        name.push_str(DATABASE_NAME_PREFIX);
        for byte in bytes {
            // Writing into a String cannot fail
            let _ = write!(name, "{:02x}", byte);
        }
        Self(name)
    }

    /// Get the database name as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DatabaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DatabaseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build the connection string for `name` by replacing the path of `base_address`
pub fn database_url(base_address: &str, name: &DatabaseName) -> Result<String> {
    let mut url = Url::parse(base_address)?;
    url.set_path(name.as_str());
    Ok(url.to_string())
}
