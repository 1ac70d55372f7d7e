//! The fetch driver: capability discovery, the single-want request, and
//! hand-off of the returned pack to ingest.

use std::io::Cursor;

use bstr::{BString, ByteSlice};
use tgit_hash::ObjectId;
use tgit_loose::LooseObjectStore;
use tgit_pack::{ingest_pack, IngestOutcome};
use tgit_transport::HttpClient;

use crate::pktline::{trim_newline, PktLine, PktLineReader, PktLineWriter};
use crate::ProtocolError;

/// The announcement that must open an `info/refs` response.
const SERVICE_ANNOUNCEMENT: &[u8] = b"# service=git-upload-pack";

/// What a completed fetch produced.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Commit the selected branch points at.
    pub tip: ObjectId,
    /// Branch that was selected.
    pub branch: String,
    /// Every ref the server advertised.
    pub advertised: Vec<(ObjectId, BString)>,
    /// Ingest statistics for the received pack.
    pub pack: IngestOutcome,
}

/// Fetch one branch from a remote into the store.
///
/// Runs the full §4.H exchange: discovery, branch selection, the
/// want/done request, NAK, pack ingest, and a residency check on the
/// fetched tip. Writing HEAD and the branch ref is the caller's job.
pub fn fetch_branch(
    http: &HttpClient,
    store: &LooseObjectStore,
    branch: &str,
) -> Result<FetchOutcome, ProtocolError> {
    let advertisement = http.info_refs()?;
    let advertised = parse_advertisement(&advertisement)?;
    let tip = select_branch(&advertised, branch)?;
    log::debug!("remote {} is at {}", branch, tip);

    let response = http.upload_pack(build_request(&tip))?;
    let pack_body = read_pack_response(&response)?;
    let pack = ingest_pack(&pack_body, store)?;
    log::debug!(
        "ingested {} object(s), {} via deltas",
        pack.object_count,
        pack.deltas_resolved
    );

    if !store.contains(&tip) {
        return Err(ProtocolError::Protocol(format!(
            "fetched pack does not contain the requested commit {tip}"
        )));
    }

    Ok(FetchOutcome {
        tip,
        branch: branch.to_string(),
        advertised,
        pack,
    })
}

/// Parse an `info/refs` response body into the advertised refs.
///
/// The first frame must be the service announcement and the second the
/// flush that ends it; the ref frames follow, `<hex-oid> SP <refname>`,
/// the first optionally carrying `NUL <capabilities>`.
pub fn parse_advertisement(
    body: &[u8],
) -> Result<Vec<(ObjectId, BString)>, ProtocolError> {
    let mut reader = PktLineReader::new(Cursor::new(body));

    match reader.read_pkt()? {
        PktLine::Data(data) if trim_newline(&data) == SERVICE_ANNOUNCEMENT => {}
        _ => return Err(ProtocolError::MissingServiceAnnouncement),
    }
    match reader.read_pkt()? {
        PktLine::Flush => {}
        _ => return Err(ProtocolError::MissingServiceAnnouncement),
    }

    let mut refs = Vec::new();
    for frame in reader.read_until_flush()? {
        let line = trim_newline(&frame);
        if line.is_empty() {
            continue;
        }
        // Capabilities ride after a NUL on the first line; this client
        // requests none, so they are dropped.
        let line = match line.find_byte(0) {
            Some(nul) => &line[..nul],
            None => line,
        };
        refs.push(parse_ref_line(line)?);
    }
    Ok(refs)
}

fn parse_ref_line(line: &[u8]) -> Result<(ObjectId, BString), ProtocolError> {
    let sp = line.find_byte(b' ').ok_or_else(|| {
        ProtocolError::Protocol(format!("malformed ref line: {:?}", line.as_bstr()))
    })?;
    let hex = std::str::from_utf8(&line[..sp])
        .map_err(|_| ProtocolError::Protocol("non-UTF-8 object id in ref line".into()))?;
    let oid = ObjectId::from_hex(hex).map_err(|e| {
        ProtocolError::Protocol(format!("bad object id in ref line: {e}"))
    })?;
    Ok((oid, BString::from(&line[sp + 1..])))
}

/// Find the tip of `refs/heads/<branch>` among the advertised refs.
pub fn select_branch(
    advertised: &[(ObjectId, BString)],
    branch: &str,
) -> Result<ObjectId, ProtocolError> {
    let wanted = format!("refs/heads/{branch}");
    advertised
        .iter()
        .find(|(_, name)| name == wanted.as_bytes())
        .map(|(oid, _)| *oid)
        .ok_or_else(|| ProtocolError::BranchNotFound(branch.to_string()))
}

/// Build the upload-pack request body: `want <hex>`, flush, `done`.
pub fn build_request(tip: &ObjectId) -> Vec<u8> {
    let mut body = Vec::new();
    let mut writer = PktLineWriter::new(&mut body);
    writer
        .write_text(&format!("want {}", tip.to_hex()))
        .expect("writing to a Vec cannot fail");
    writer.write_flush().expect("writing to a Vec cannot fail");
    writer.write_text("done").expect("writing to a Vec cannot fail");
    body
}

/// Split an upload-pack response into its pack body.
///
/// The first frame must be `NAK`; the second is the packfile, after
/// which framing stops.
pub fn read_pack_response(body: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let mut reader = PktLineReader::new(Cursor::new(body));
    match reader.read_pkt()? {
        PktLine::Data(data) if trim_newline(&data) == b"NAK" => {}
        _ => return Err(ProtocolError::MissingNak),
    }
    reader.read_pack_body()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIP: &str = "95d09f2b10159347eece71399a7e2e907ea3df4f";

    fn advertisement(lines: &[&str]) -> Vec<u8> {
        let mut body = Vec::new();
        let mut w = PktLineWriter::new(&mut body);
        w.write_text("# service=git-upload-pack").unwrap();
        w.write_flush().unwrap();
        for line in lines {
            w.write_text(line).unwrap();
        }
        w.write_flush().unwrap();
        body
    }

    #[test]
    fn parse_simple_advertisement() {
        let body = advertisement(&[
            &format!("{TIP} HEAD\0multi_ack side-band-64k agent=git/2.39.0"),
            &format!("{TIP} refs/heads/master"),
        ]);
        let refs = parse_advertisement(&body).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].1, "HEAD");
        assert_eq!(refs[1].1, "refs/heads/master");
        assert_eq!(refs[0].0.to_hex(), TIP);
    }

    #[test]
    fn missing_announcement_rejected() {
        let mut body = Vec::new();
        let mut w = PktLineWriter::new(&mut body);
        w.write_text(&format!("{TIP} refs/heads/master")).unwrap();
        w.write_flush().unwrap();
        assert!(matches!(
            parse_advertisement(&body),
            Err(ProtocolError::MissingServiceAnnouncement)
        ));
    }

    #[test]
    fn announcement_without_flush_rejected() {
        let mut body = Vec::new();
        let mut w = PktLineWriter::new(&mut body);
        w.write_text("# service=git-upload-pack").unwrap();
        w.write_text(&format!("{TIP} refs/heads/master")).unwrap();
        w.write_flush().unwrap();
        assert!(matches!(
            parse_advertisement(&body),
            Err(ProtocolError::MissingServiceAnnouncement)
        ));
    }

    #[test]
    fn select_master() {
        let refs = vec![
            (ObjectId::from_hex(TIP).unwrap(), BString::from("HEAD")),
            (
                ObjectId::from_hex(TIP).unwrap(),
                BString::from("refs/heads/master"),
            ),
        ];
        assert_eq!(select_branch(&refs, "master").unwrap().to_hex(), TIP);
    }

    #[test]
    fn absent_branch_is_an_error() {
        let refs = vec![(
            ObjectId::from_hex(TIP).unwrap(),
            BString::from("refs/heads/develop"),
        )];
        assert!(matches!(
            select_branch(&refs, "master"),
            Err(ProtocolError::BranchNotFound(name)) if name == "master"
        ));
    }

    #[test]
    fn request_shape() {
        let tip = ObjectId::from_hex(TIP).unwrap();
        let body = build_request(&tip);
        let expected = format!("0032want {TIP}\n00000009done\n");
        assert_eq!(body, expected.as_bytes());
    }

    #[test]
    fn response_requires_nak() {
        let mut body = Vec::new();
        let mut w = PktLineWriter::new(&mut body);
        w.write_text("ACK deadbeef").unwrap();
        assert!(matches!(
            read_pack_response(&body),
            Err(ProtocolError::MissingNak)
        ));
    }

    #[test]
    fn response_splits_pack_body() {
        let mut body = Vec::new();
        {
            let mut w = PktLineWriter::new(&mut body);
            w.write_text("NAK").unwrap();
            w.write_line(b"PACK....").unwrap();
        }
        body.extend_from_slice(b"rest of the pack");
        let pack = read_pack_response(&body).unwrap();
        assert_eq!(pack, b"PACK....rest of the pack");
    }
}
