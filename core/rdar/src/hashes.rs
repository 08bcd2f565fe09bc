use crate::error::Result;
use std::collections::HashMap;
use std::io::BufRead;

/// Parse a `name,hash` list, one entry per line with a decimal hash.
///
/// Lines without a comma or with an unparsable hash are skipped.
pub fn read_hashes<R: BufRead>(reader: R) -> Result<HashMap<u64, String>> {
    let mut result = HashMap::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');

        let Some((name, hash)) = line.split_once(',') else {
            continue;
        };

        match hash.trim().parse::<u64>() {
            Ok(hash) => {
                result.insert(hash, name.to_string());
            }
            Err(_) => tracing::warn!("hash list line {}: bad hash {:?}", number + 1, hash),
        }
    }

    tracing::debug!("loaded {} file name(s)", result.len());
    Ok(result)
}
