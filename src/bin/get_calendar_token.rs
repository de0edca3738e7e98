use fightcal::components::google_calendar::FileCredentialProvider;
use fightcal::config::Config;
use fightcal::error::{auth_error, other_error, SyncResult};
use url::Url;

const REDIRECT_URI: &str = "http://localhost:8080";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    authorize().await?;
    Ok(())
}

async fn authorize() -> SyncResult<()> {
    // Load configuration
    let config = Config::load()?;

    let credentials = FileCredentialProvider::new(
        config.token_path.clone(),
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();

    // Construct authorization URL
    let auth_url = Url::parse_with_params(
        "https://accounts.google.com/o/oauth2/v2/auth",
        &[
            ("client_id", config.google_client_id.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("response_type", "code"),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("scope", CALENDAR_SCOPE),
            ("state", state.as_str()),
        ],
    )
    .map_err(|e| other_error(&format!("Failed to build authorization URL: {}", e)))?;

    // Open browser for authorization
    println!("Opening browser for Google Calendar authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        println!("Could not open a browser, visit this URL instead:\n{}", auth_url);
    }

    // Start local server to receive the callback
    let server = tiny_http::Server::http("127.0.0.1:8080")
        .map_err(|e| other_error(&format!("Failed to start callback server: {}", e)))?;
    println!("Waiting for authorization callback...");

    // Handle the callback
    let request = server.recv()?;
    let callback = Url::parse(REDIRECT_URI)
        .and_then(|base| base.join(request.url()))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let param = |name: &str| {
        callback
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if param("state").as_deref() != Some(state.as_str()) {
        return Err(auth_error("Authorization callback state does not match"));
    }
    let code = param("code").ok_or_else(|| {
        auth_error(&format!(
            "No authorization code found in callback: {}",
            param("error").unwrap_or_default()
        ))
    })?;

    // Exchange code for tokens and save them
    credentials.exchange_code(&code, REDIRECT_URI).await?;

    // Send success response to browser
    let response =
        tiny_http::Response::from_string("Authorization successful! You can close this window.");
    request.respond(response)?;

    println!("Token successfully saved to {}", credentials.path().display());

    Ok(())
}
