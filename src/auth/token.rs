// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API token file.

use std::{fs, io, io::Write, path::Path};

use base64ct::{Base64UrlUnpadded, Encoding};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

/// Random bytes in a freshly generated token.
const TOKEN_BYTES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token file I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("token file is empty: {0}")]
    Empty(String),

    #[error("system random number generator failed")]
    Rng,
}

/// The accepted bearer token, held as its SHA-256 digest.
#[derive(Clone)]
pub struct ApiToken {
    digest: [u8; 32],
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

impl ApiToken {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            digest: Sha256::digest(secret.as_bytes()).into(),
        }
    }

    /// Read the token file, creating it with a new random token if missing.
    ///
    /// Returns the token and whether the file was created.
    pub fn load_or_create(path: &Path) -> Result<(Self, bool), TokenError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let secret = contents.trim();
                if secret.is_empty() {
                    return Err(TokenError::Empty(path.display().to_string()));
                }
                Ok((Self::from_secret(secret), false))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let secret = generate_secret()?;
                write_token_file(path, &secret)?;
                Ok((Self::from_secret(&secret), true))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn verify(&self, presented: &str) -> bool {
        let presented: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
        presented == self.digest
    }
}

fn generate_secret() -> Result<String, TokenError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| TokenError::Rng)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

fn write_token_file(path: &Path, secret: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(secret.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}
