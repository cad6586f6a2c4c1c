use crate::error::InputError;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Work out the narration text.
///
/// `text_arg` is read as a file when it names one, taken literally otherwise,
/// and `stdin` is drained when it is absent. Blank text is an error.
pub fn resolve_text(text_arg: Option<&str>, mut stdin: impl Read) -> Result<String, InputError> {
    let text = match text_arg {
        Some(arg) if Path::new(arg).is_file() => fs::read_to_string(arg)?,
        Some(arg) => arg.to_string(),
        None => {
            let mut buf = String::new();
            stdin.read_to_string(&mut buf)?;
            buf
        }
    };

    if text.trim().is_empty() {
        return Err(InputError::Empty);
    }
    Ok(text)
}
