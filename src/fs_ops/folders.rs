//! Date-folder pre-creation.
//! Every date folder gets both `!jpg` and `!orig`, even when unused, so the
//! layout is predictable for whatever runs after us. Idempotent.

use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::helpers::io_error_with_help;
use crate::plan::{JPG_SUBFOLDER, ORIG_SUBFOLDER};

pub fn ensure_date_folders<I, S>(output: &Path, date_folders: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for date in date_folders {
        let date_path = output.join(date.as_ref());
        for sub in [JPG_SUBFOLDER, ORIG_SUBFOLDER] {
            let dir = date_path.join(sub);
            fs::create_dir_all(&dir).map_err(io_error_with_help("create date folder", &dir))?;
        }
        debug!(path = %date_path.display(), "date folder ready");
    }
    Ok(())
}
