use lib_utils::b64::b64u_encode;
use rand::RngCore;

/// Prints a 256-bit key, base64url encoded, suitable for `SERVICE_ENCRYPT_KEY`.
fn main() {
    let mut key = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut key);
    println!("{}", b64u_encode(key));
}
