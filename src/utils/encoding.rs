use std::fs;
use anyhow::Result;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Load a text file, stripping a UTF-8 BOM and falling back to GBK
pub fn load_text_file_with_guess_encoding(file_path: &str) -> Result<String> {
    let bytes = fs::read(file_path)?;
    Ok(decode_text(&bytes))
}

/// Decode bytes produced by a child process or read from disk.
///
/// RVC installs on Chinese-locale Windows hosts print GBK, so anything that is not
/// valid UTF-8 is decoded as GBK rather than mangled with replacement characters.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&UTF8_BOM[..]).unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (cow, _, _) = encoding_rs::GBK.decode(bytes);
            cow.into_owned()
        }
    }
}
