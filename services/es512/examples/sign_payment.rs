use tlsign_core::{Context, OsEnv, Result};
use tlsign_es512::{Config, Credential, PrivateKey, RequestSigner, TL_SIGNATURE};

const DEMO_KID: &str = "45fc75cf-5649-4134-84b3-192c2c78e990";
const DEMO_KEY: &str = include_str!("../tests/keys/ec512-private.pem");

fn main() -> Result<()> {
    let _ = env_logger::try_init();
    let _ = dotenv::dotenv();

    // Load TL_SIGNING_KID and TL_SIGNING_PRIVATE_KEY(_FILE) from the environment
    let ctx = Context::new().with_env(OsEnv);
    let credential = match Config::from_env(&ctx).load_credential(&ctx)? {
        Some(cred) => cred,
        None => {
            println!("No signing key found in environment, using demo key");
            Credential::new(DEMO_KID, PrivateKey::from_pem(DEMO_KEY)?)?
        }
    };

    let signer = RequestSigner::new(credential).with_headers(["Idempotency-Key"]);

    let idempotency_key = uuid::Uuid::new_v4().to_string();
    let body = r#"{"currency":"GBP","max_amount_in_minor":5000000}"#;
    let mut req = http::Request::builder()
        .method("POST")
        .uri("https://api.truelayer-sandbox.com/test-signature")
        .header("Idempotency-Key", idempotency_key.as_str())
        .header("Content-Type", "application/json")
        .body(body.as_bytes().to_vec())
        .map_err(|e| tlsign_core::Error::unexpected("failed to build request").with_source(e))?;

    match signer.sign_request(&mut req) {
        Ok(()) => {
            println!("Request signed successfully!");
            println!("Idempotency-Key: {idempotency_key}");
            if let Some(value) = req.headers().get(TL_SIGNATURE) {
                println!("Tl-Signature: {}", value.to_str().unwrap_or_default());
            }
        }
        Err(e) => {
            eprintln!("Failed to sign request: {e}");
        }
    }

    Ok(())
}
