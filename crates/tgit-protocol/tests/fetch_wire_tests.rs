//! Wire-level fetch tests over synthesized server responses.

use tgit_hash::Hasher;
use tgit_loose::LooseObjectStore;
use tgit_object::{Object, ObjectType};
use tgit_pack::entry::encode_entry_header;
use tgit_pack::{ingest_pack, zlib, PACK_SIGNATURE, PACK_VERSION};
use tgit_protocol::fetch::{parse_advertisement, read_pack_response, select_branch};
use tgit_protocol::pktline::PktLineWriter;

/// A commit payload this client's strict parser accepts.
const COMMIT_PAYLOAD: &[u8] = b"tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\n\
author A U Thor <au@example.com> 0 +0000\n\
committer A U Thor <au@example.com> 0 +0000\n\nx\n";

fn build_pack(objects: &[(ObjectType, &[u8])]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(PACK_SIGNATURE);
    buf.extend_from_slice(&PACK_VERSION.to_be_bytes());
    buf.extend_from_slice(&(objects.len() as u32).to_be_bytes());
    for (obj_type, payload) in objects {
        let type_num = match obj_type {
            ObjectType::Commit => 1,
            ObjectType::Tree => 2,
            ObjectType::Blob => 3,
            ObjectType::Tag => 4,
        };
        buf.extend_from_slice(&encode_entry_header(type_num, payload.len() as u64));
        buf.extend_from_slice(&zlib::compress(payload));
    }
    let trailer = Hasher::digest(&buf);
    buf.extend_from_slice(trailer.as_bytes());
    buf
}

/// The full server side of a clone: advertisement and upload-pack
/// response, exactly as they come off the wire.
#[test]
fn discovery_to_ingest_pipeline() {
    let commit_oid = Hasher::hash_object("commit", COMMIT_PAYLOAD);
    let tree_oid = Hasher::hash_object("tree", b"");

    // info/refs response.
    let mut advertisement = Vec::new();
    {
        let mut w = PktLineWriter::new(&mut advertisement);
        w.write_text("# service=git-upload-pack").unwrap();
        w.write_flush().unwrap();
        w.write_text(&format!(
            "{} HEAD\0multi_ack ofs-delta agent=git/2.39.0",
            commit_oid.to_hex()
        ))
        .unwrap();
        w.write_text(&format!("{} refs/heads/master", commit_oid.to_hex()))
            .unwrap();
        w.write_flush().unwrap();
    }

    let advertised = parse_advertisement(&advertisement).unwrap();
    let tip = select_branch(&advertised, "master").unwrap();
    assert_eq!(tip, commit_oid);

    // upload-pack response: NAK frame, then the pack with framing
    // dropped mid-stream.
    let pack = build_pack(&[(ObjectType::Commit, COMMIT_PAYLOAD), (ObjectType::Tree, b"")]);
    let mut response = Vec::new();
    {
        let mut w = PktLineWriter::new(&mut response);
        w.write_text("NAK").unwrap();
        w.write_line(&pack[..30]).unwrap();
    }
    response.extend_from_slice(&pack[30..]);

    let pack_body = read_pack_response(&response).unwrap();
    assert_eq!(pack_body, pack);

    let dir = tempfile::tempdir().unwrap();
    let store = LooseObjectStore::open(dir.path().join("objects"));
    let outcome = ingest_pack(&pack_body, &store).unwrap();
    assert_eq!(outcome.object_count, 2);

    assert!(store.contains(&tip));
    assert!(store.contains(&tree_oid));
    match store.read(&tip).unwrap() {
        Object::Commit(c) => {
            assert_eq!(c.tree, tree_oid);
            assert_eq!(c.message, "x");
        }
        other => panic!("unexpected object: {other:?}"),
    }
}
