use std::{
    fs, io,
    path::Path,
    sync::atomic::{AtomicI64, Ordering},
};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use mime_guess::MimeGuess;

#[macro_export]
macro_rules! unit_short {
  ($name:expr, $($tail:tt)*) => {
    {
      log::info!("* {}",$name);
      let now = std::time::Instant::now();
      let value = $($tail)*;
      log::info!("Done  `{}` ({} ms)", $name, now.elapsed().as_millis());
      value
    }
  };
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Time-derived id: milliseconds since the Unix epoch, bumped when two ids
/// would land on the same millisecond.
pub fn time_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_ID.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next.to_string(),
            Err(current) => last = current,
        }
    }
}

/// Inline a local image file as a `data:image/...;base64,` payload.
pub fn image_data_url(path: &Path) -> io::Result<String> {
    let mime = MimeGuess::from_path(path).first_or_octet_stream();
    if mime.type_().as_str() != "image" {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not an image ({mime})", path.display()),
        ));
    }

    let bytes = fs::read(path)?;
    Ok(format!("data:{mime};base64,{}", BASE64.encode(bytes)))
}

/// Resolve an image argument: an existing file is inlined, anything else is
/// taken as a URL.
pub fn resolve_image(value: &str) -> io::Result<String> {
    let path = Path::new(value);
    if path.is_file() {
        image_data_url(path)
    } else {
        Ok(value.to_string())
    }
}
