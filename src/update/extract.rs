use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::UpdateError;

/// Unpack a verified release archive into the vacated library directory.
///
/// Archives are gzip-compressed PAX tarballs. Any failure here is answered
/// with a rollback by the caller; the checksum has already been verified so
/// a corrupt archive at this point means the download was truncated on disk
/// or the filesystem failed.
pub fn install_archive(archive: &Path, lib: &Path) -> Result<(), UpdateError> {
    let file = File::open(archive).map_err(|e| UpdateError::extraction(archive, e))?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let mut tarball = tar::Archive::new(decoder);

    tarball
        .unpack(lib)
        .map_err(|e| UpdateError::extraction(archive, e))?;

    Ok(())
}
