//! Example of using the FortiGate API client
//!
//! Reads FGT_HOST, FGT_USERNAME and FGT_SECRET_KEY (plus optional FGT_SCHEME,
//! FGT_DEBUG, FGT_INSECURE) from the environment.
use fgtapi::{ClientBuilder, FgtError};
use serde_json::json;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Enable logging
    env_logger::init();

    // Login
    let client = ClientBuilder::from_env()?.connect().await?;
    println!("Authenticated to {}", client.base_url());

    client
        .with_session(|client| async move {
            // System status
            let status = client.execute("get", "monitor", "system", "status", None, None, None, None).await?;
            println!("System status: \n{:#}", status);

            // Firewall policies in the root vdom
            let query = [("vdom", "root")];
            let policies =
                client.execute("get", "cmdb", "firewall", "policy", None, None, Some(&query[..]), None).await?;
            println!("Firewall policies: \n{:#}", policies);

            // Add, then remove, an address object
            let address = json!({
                "name": "fgtapi-demo",
                "subnet": "192.0.2.10 255.255.255.255",
                "comment": "created by fgtapi demo"
            });
            let _ = client.execute("delete", "cmdb", "firewall", "address", None, Some("fgtapi-demo"), None, None).await;
            let created = client.execute("post", "cmdb", "firewall", "address", None, None, None, Some(&address)).await?;
            println!("Address added: \n{:#}", created);
            client.execute("delete", "cmdb", "firewall", "address", None, Some("fgtapi-demo"), None, None).await?;

            Ok::<_, FgtError>(())
        })
        .await?;

    Ok(())
}
