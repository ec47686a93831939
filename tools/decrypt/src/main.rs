use std::env;

use lib_utils::crypt;

/// Decrypts a single ciphertext passed as the first CLI argument, using `SERVICE_ENCRYPT_KEY`
/// from the environment. Useful for inspecting a stored access/refresh token by hand.
fn main() {
    dotenvy::dotenv().ok();

    let ciphertext = env::args()
        .nth(1)
        .unwrap_or_else(|| panic!("usage: decrypt <ciphertext>"));

    match crypt::decrypt(&ciphertext) {
        Ok(plaintext) => println!("{plaintext}"),
        Err(e) => eprintln!("decrypt failed: {e}"),
    }
}
