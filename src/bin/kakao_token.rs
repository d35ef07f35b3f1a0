//! One-time helper that turns a Kakao authorization code into the refresh
//! token the watcher needs.

use anyhow::{bail, Result};
use std::io::{self, BufRead, Write};

use otr_audition_watch::config::{Settings, ENV_REFRESH_TOKEN, ENV_REST_API_KEY};
use otr_audition_watch::notify::{KakaoApi, NotifyError};
use otr_audition_watch::utils::http::create_api_client;

const ENV_REDIRECT_URI: &str = "KAKAO_REDIRECT_URI";
const ENV_CLIENT_SECRET: &str = "KAKAO_CLIENT_SECRET";

fn require_env(key: &'static str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(NotifyError::MissingEnv(key).into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let rest_api_key = require_env(ENV_REST_API_KEY)?;
    let redirect_uri = require_env(ENV_REDIRECT_URI)?;
    let client_secret = std::env::var(ENV_CLIENT_SECRET).ok();

    let settings = Settings::load()?;
    let api = KakaoApi::new(create_api_client(settings.http_timeout())?, &settings);

    println!("1) Open this URL in a browser and login to Kakao:");
    println!("{}", api.authorize_url(&rest_api_key, &redirect_uri)?);
    println!("\n2) After consent, you will be redirected to REDIRECT_URI with ?code=... in the URL.");
    print!("\nPaste the code value here: ");
    io::stdout().flush()?;

    let mut code = String::new();
    io::stdin().lock().read_line(&mut code)?;
    let code = code.trim();
    if code.is_empty() {
        bail!("No code provided");
    }

    let token = match api
        .exchange_code(&rest_api_key, client_secret.as_deref(), &redirect_uri, code)
        .await
    {
        Ok(token) => token,
        Err(e) => {
            if let Some(NotifyError::Status { status, body, .. }) = e.downcast_ref::<NotifyError>() {
                println!("HTTP {}: {}", status, body);
            }
            return Err(e);
        }
    };

    let Some(refresh_token) = token.refresh_token else {
        bail!("No refresh_token in response");
    };

    println!("\nSave these to GitHub repo Secrets:");
    println!("{} = {}", ENV_REST_API_KEY, rest_api_key);
    println!("{} = {}", ENV_REFRESH_TOKEN, refresh_token);

    Ok(())
}
