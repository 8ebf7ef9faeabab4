use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "correct-horse";

/// The server binary running on the memory store with a bootstrap user.
/// Killed on drop.
pub struct TestServer {
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_games-api"))
            .env("GAMES_API_HOST", "127.0.0.1")
            .env("GAMES_API_PORT", port.to_string())
            .env("STORE_BACKEND", "memory")
            .env("SECRET_KEY", "integration-secret")
            .env("ALGORITHM", "HS256")
            .env("ACCESS_TOKEN_EXPIRE_MINUTES", "5")
            .env("BCRYPT_COST", "4")
            .env("BOOTSTRAP_USERNAME", USERNAME)
            .env("BOOTSTRAP_PASSWORD", PASSWORD)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self { base_url, child };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, client: &reqwest::Client) -> Result<String> {
        let res = client
            .post(self.url("/token"))
            .form(&[("username", USERNAME), ("password", PASSWORD)])
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body = res.json::<serde_json::Value>().await?;
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .context("missing access_token")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
