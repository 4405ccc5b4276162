use std::io;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream;

use substream::application::ports::{MediaStore, MediaStoreError};
use substream::domain::{StoragePath, StreamId};
use substream::infrastructure::storage::ObjectMediaStore;

fn create_local_store() -> (tempfile::TempDir, ObjectMediaStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = ObjectMediaStore::local(dir.path().to_path_buf()).unwrap();
    (dir, store)
}

fn path(rel: &str) -> StoragePath {
    StoragePath::new(&StreamId::parse("job1").unwrap(), rel)
}

#[tokio::test]
async fn given_valid_stream_when_storing_then_file_is_persisted_under_job_prefix() {
    let (dir, store) = create_local_store();

    let chunks: Vec<Result<Bytes, io::Error>> =
        vec![Ok(Bytes::from("hello ")), Ok(Bytes::from("world"))];
    let size = store
        .store(&path("audios/job1_1.wav"), stream::iter(chunks).boxed(), None)
        .await
        .unwrap();

    assert_eq!(size, 11);
    let on_disk = std::fs::read(dir.path().join("job1/audios/job1_1.wav")).unwrap();
    assert_eq!(on_disk, b"hello world");
}

#[tokio::test]
async fn given_put_object_when_getting_then_bytes_match() {
    let (_dir, store) = create_local_store();

    store
        .put(&path("job1.srt"), Bytes::from_static(b"1\n"))
        .await
        .unwrap();

    assert_eq!(store.get(&path("job1.srt")).await.unwrap(), Bytes::from_static(b"1\n"));
    assert_eq!(store.head(&path("job1.srt")).await.unwrap(), 2);
}

#[tokio::test]
async fn given_missing_object_when_getting_then_not_found() {
    let store = ObjectMediaStore::in_memory();

    let result = store.get(&path("nothing.mp4")).await;

    assert!(matches!(result, Err(MediaStoreError::NotFound(_))));
}

#[tokio::test]
async fn given_stored_object_when_deleting_then_get_fails() {
    let store = ObjectMediaStore::in_memory();
    store.put(&path("a.txt"), Bytes::from("data")).await.unwrap();

    store.delete(&path("a.txt")).await.unwrap();

    assert!(store.get(&path("a.txt")).await.is_err());
}

#[tokio::test]
async fn given_stream_error_when_storing_then_returns_io_error() {
    let store = ObjectMediaStore::in_memory();

    let chunks: Vec<Result<Bytes, io::Error>> = vec![
        Ok(Bytes::from("partial")),
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away")),
    ];
    let result = store
        .store(&path("broken.mp4"), stream::iter(chunks).boxed(), None)
        .await;

    assert!(matches!(result, Err(MediaStoreError::Io(_))));
}

#[tokio::test]
async fn given_local_file_when_uploading_and_downloading_then_contents_round_trip() {
    let store = ObjectMediaStore::in_memory();
    let scratch = tempfile::TempDir::new().unwrap();
    let source = scratch.path().join("source.wav");
    std::fs::write(&source, b"RIFF fake wav").unwrap();

    let written = store.upload_file(&path("audios/job1_1.wav"), &source).await.unwrap();
    let target = scratch.path().join("copy.wav");
    store
        .download_file(&path("audios/job1_1.wav"), &target)
        .await
        .unwrap();

    assert_eq!(written, 13);
    assert_eq!(std::fs::read(target).unwrap(), b"RIFF fake wav");
}

#[tokio::test]
async fn given_stored_object_when_copying_then_target_has_same_bytes() {
    let (_dir, store) = create_local_store();
    store.put(&path("clip.mp4"), Bytes::from("source")).await.unwrap();

    store.copy(&path("clip.mp4"), &path("clip.transformed.mp4")).await.unwrap();

    assert_eq!(
        store.get(&path("clip.transformed.mp4")).await.unwrap(),
        Bytes::from("source")
    );
    assert!(store.head(&path("clip.mp4")).await.is_ok());
}

#[tokio::test]
async fn given_missing_object_when_copying_then_not_found() {
    let store = ObjectMediaStore::in_memory();

    let result = store.copy(&path("absent.mp4"), &path("absent.transformed.mp4")).await;

    assert!(matches!(result, Err(MediaStoreError::NotFound(_))));
}

#[tokio::test]
async fn given_multipart_object_when_downloading_to_file_then_every_part_is_written() {
    let (_dir, store) = create_local_store();
    let chunks: Vec<Result<Bytes, io::Error>> =
        vec![Ok(Bytes::from("part one, ")), Ok(Bytes::from("part two"))];
    store
        .store(&path("clip.mp4"), stream::iter(chunks).boxed(), None)
        .await
        .unwrap();
    let target = tempfile::TempDir::new().unwrap();
    let local = target.path().join("clip.mp4");

    let size = store.download_file(&path("clip.mp4"), &local).await.unwrap();

    assert_eq!(size, 18);
    assert_eq!(std::fs::read(&local).unwrap(), b"part one, part two");
}
