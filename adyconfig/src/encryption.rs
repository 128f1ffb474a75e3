//! Chiffrement des mots de passe basé sur l'identifiant de la machine
//!
//! Les mots de passe de l'API (compte marchand et compte payout) peuvent être
//! stockés chiffrés dans `config.yaml` sous la forme `encrypted:BASE64`.
//! La clé est dérivée de l'identifiant matériel de la machine, ce qui rend le
//! fichier non portable mais protégé.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::error::{ConfigError, Result};

/// Préfixe pour identifier les mots de passe chiffrés
const ENCRYPTED_PREFIX: &str = "encrypted:";

const KEY_SALT: &[u8] = b"adyen-config-encryption-v1";
const NONCE_SALT: &[u8] = b"adyen-nonce-v1";
const NONCE_LEN: usize = 12;

/// Récupère l'identifiant matériel de la machine
///
/// Sur macOS, utilise `ioreg -d2 -c IOPlatformExpertDevice`
/// Sur Linux, utilise `/etc/machine-id` ou `/var/lib/dbus/machine-id`
fn get_machine_id() -> Result<String> {
    #[cfg(target_os = "macos")]
    {
        let output = std::process::Command::new("ioreg")
            .args(["-d2", "-c", "IOPlatformExpertDevice"])
            .output()?;

        let output_str = String::from_utf8_lossy(&output.stdout);
        for line in output_str.lines() {
            if line.contains("IOPlatformUUID") {
                if let Some(uuid) = line.split('"').nth(3) {
                    return Ok(uuid.to_string());
                }
            }
        }

        Err(ConfigError::encryption("IOPlatformUUID not found in ioreg output"))
    }

    #[cfg(target_os = "linux")]
    {
        for candidate in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
            if let Ok(id) = std::fs::read_to_string(candidate) {
                let id = id.trim();
                if !id.is_empty() {
                    return Ok(id.to_string());
                }
            }
        }

        Err(ConfigError::encryption("Failed to read machine-id"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        Err(ConfigError::encryption(
            "Unsupported platform for machine id extraction",
        ))
    }
}

/// Dérive une clé AES-256 à partir d'un identifiant de machine
fn derive_key(machine_id: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(machine_id.as_bytes());
    hasher.update(KEY_SALT);

    let mut key = [0u8; 32];
    key.copy_from_slice(&hasher.finalize());
    key
}

fn cipher_for(machine_id: &str) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(&derive_key(machine_id))
        .map_err(|e| ConfigError::encryption(format!("Failed to create cipher: {}", e)))
}

fn encrypt_with(machine_id: &str, password: &str) -> Result<String> {
    let cipher = cipher_for(machine_id)?;

    // Nonce dérivé du mot de passe : même mot de passe, même chiffré.
    // Le fichier de configuration n'est donc pas réécrit inutilement.
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(NONCE_SALT);
    let nonce_hash = hasher.finalize();
    let nonce_bytes = &nonce_hash[..NONCE_LEN];

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(nonce_bytes), password.as_bytes())
        .map_err(|e| ConfigError::encryption(format!("Encryption failed: {}", e)))?;

    // Format : nonce(12 octets) + ciphertext
    let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(format!(
        "{}{}",
        ENCRYPTED_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(&combined)
    ))
}

fn decrypt_with(machine_id: &str, encrypted: &str) -> Result<String> {
    let base64_data = encrypted.strip_prefix(ENCRYPTED_PREFIX).ok_or_else(|| {
        ConfigError::encryption("Invalid encrypted password format (missing prefix)")
    })?;

    let combined = base64::engine::general_purpose::STANDARD
        .decode(base64_data)
        .map_err(|e| ConfigError::encryption(format!("Invalid base64: {}", e)))?;

    if combined.len() < NONCE_LEN {
        return Err(ConfigError::encryption("Invalid ciphertext (too short)"));
    }
    let (nonce, ciphertext) = combined.split_at(NONCE_LEN);

    let plaintext = cipher_for(machine_id)?
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| {
            ConfigError::encryption(format!(
                "Decryption failed (wrong machine or corrupted data): {}",
                e
            ))
        })?;

    String::from_utf8(plaintext).map_err(|e| ConfigError::encryption(format!("Invalid UTF-8: {}", e)))
}

/// Chiffre un mot de passe avec la clé dérivée de la machine
///
/// Retourne `encrypted:BASE64`.
pub fn encrypt_password(password: &str) -> Result<String> {
    encrypt_with(&get_machine_id()?, password)
}

/// Déchiffre un mot de passe au format `encrypted:BASE64`
pub fn decrypt_password(encrypted: &str) -> Result<String> {
    decrypt_with(&get_machine_id()?, encrypted)
}

/// Vérifie si une valeur est un mot de passe chiffré
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENCRYPTED_PREFIX)
}

/// Obtient le mot de passe en clair, qu'il soit chiffré ou non
pub fn get_password(value: &str) -> Result<String> {
    if is_encrypted(value) {
        decrypt_password(value)
    } else {
        Ok(value.to_string())
    }
}
