//! Chiffre ou déchiffre un mot de passe pour `config.yaml`
//!
//! Usage:
//!   cargo run --example encrypt_password -- encrypt "ws_password"
//!   cargo run --example encrypt_password -- decrypt "encrypted:ABC123..."

use adyconfig::encryption::{decrypt_password, encrypt_password, is_encrypted};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match (args.get(1).map(String::as_str), args.get(2)) {
        (Some("encrypt"), Some(password)) => {
            let encrypted = encrypt_password(password)?;
            println!("Encrypted: {}", encrypted);
            println!("\nAdd this to your config.yaml:");
            println!("    password: \"{}\"", encrypted);
        }
        (Some("decrypt"), Some(encrypted)) => {
            if !is_encrypted(encrypted) {
                eprintln!("Error: Value does not start with 'encrypted:'");
                return Ok(());
            }
            match decrypt_password(encrypted) {
                Ok(password) => println!("Decrypted: {}", password),
                Err(e) => {
                    eprintln!("Error: Failed to decrypt password");
                    eprintln!("This encrypted password was created on a different machine.");
                    eprintln!("Details: {}", e);
                }
            }
        }
        _ => print_usage(),
    }

    Ok(())
}

fn print_usage() {
    println!("Usage:");
    println!("  encrypt_password encrypt <password>");
    println!("  encrypt_password decrypt <encrypted:...>");
}
