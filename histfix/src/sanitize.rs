use std::io::{self, BufRead, BufReader, Read, Write};

/// GNU `strings` default minimum run length.
pub const DEFAULT_MIN_LEN: usize = 4;

fn is_printable(b: u8) -> bool {
    b == b'\t' || (0x20..=0x7e).contains(&b)
}

/// Copy every run of at least `min_len` printable ASCII bytes from `reader`
/// to `out`, one run per line. Returns the number of runs written.
pub fn extract_printable<R: Read, W: Write>(reader: R, mut out: W, min_len: usize) -> io::Result<u64> {
    let mut reader = BufReader::new(reader);
    let mut run: Vec<u8> = Vec::new();
    let mut written = 0u64;

    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        for &b in buf {
            if is_printable(b) {
                run.push(b);
            } else {
                written += flush_run(&mut run, &mut out, min_len)?;
            }
        }
        let len = buf.len();
        reader.consume(len);
    }
    written += flush_run(&mut run, &mut out, min_len)?;
    out.flush()?;
    Ok(written)
}

fn flush_run<W: Write>(run: &mut Vec<u8>, out: &mut W, min_len: usize) -> io::Result<u64> {
    let emitted = if !run.is_empty() && run.len() >= min_len {
        out.write_all(run)?;
        out.write_all(b"\n")?;
        1
    } else {
        0
    };
    run.clear();
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(input: &[u8], min_len: usize) -> String {
        let mut out = Vec::new();
        extract_printable(input, &mut out, min_len).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn strips_control_bytes_between_commands() {
        let cleaned = clean(b"ls -la\x00\x01corrupt\ncd /tmp\n", DEFAULT_MIN_LEN);
        assert_eq!(cleaned, "ls -la\ncorrupt\ncd /tmp\n");
    }

    #[test]
    fn drops_short_runs() {
        let cleaned = clean(b"ls\npwd\n\xffgit status\n", DEFAULT_MIN_LEN);
        assert_eq!(cleaned, "git status\n");
    }

    #[test]
    fn keeps_tabs_and_trailing_run_without_newline() {
        let cleaned = clean(b"echo\ta\x07tail -f log", 1);
        assert_eq!(cleaned, "echo\ta\ntail -f log\n");
    }

    #[test]
    fn filtering_is_idempotent() {
        let first = clean(b": 1700000000:0;make\x00\x9b\x1b[Acargo build\n", DEFAULT_MIN_LEN);
        let second = clean(first.as_bytes(), DEFAULT_MIN_LEN);
        assert_eq!(first, second);
    }

    #[test]
    fn counts_emitted_runs() {
        let mut out = Vec::new();
        let n = extract_printable(&b"abcd\x00ef\x00ghij"[..], &mut out, 4).unwrap();
        assert_eq!(n, 2);
    }
}
