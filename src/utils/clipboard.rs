use anyhow::{anyhow, Result};

pub fn set_string(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| anyhow!("clipboard unavailable: {}", e))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| anyhow!("clipboard write failed: {}", e))?;
    Ok(())
}
