//! Print the inventory API's OpenAPI document as JSON.
//!
//! Used to publish the contract for agent and dashboard clients without
//! starting the server.

use std::io::Write;

use inventory_backend::doc::ApiDoc;
use utoipa::OpenApi;

fn main() -> std::io::Result<()> {
    let document = ApiDoc::openapi()
        .to_pretty_json()
        .map_err(std::io::Error::other)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{document}")
}
