//! Operator helper: hash a password for the user list.
//!
//! ```text
//! hashpw <password>          print an Argon2id hash for the password
//! hashpw --gen-secret [len]  print a fresh signing secret (default 48)
//! ```
//!
//! The output of the first form goes into the `password_hash` field of an
//! entry in the users file; the second bootstraps `TOLLGATE_SECRET`.

use tollgate::secret::generate_secure_secret;
use tollgate::{HashingCost, PasswordHasher};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("--gen-secret") => {
            let length = match args.next() {
                Some(raw) => raw.parse()?,
                None => 48,
            };
            println!("{}", generate_secure_secret(length));
        }
        Some(password) => {
            let hasher = PasswordHasher::new(HashingCost::default())?;
            println!("{}", hasher.hash(password)?);
        }
        None => {
            eprintln!("usage: hashpw <password> | hashpw --gen-secret [length]");
            std::process::exit(2);
        }
    }

    Ok(())
}
