use rockarchive_core::{AssetStore, ImageRef, ImageUpload, PLACEHOLDER_IMAGE_URL};

#[test]
fn save_without_upload_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let assets = AssetStore::new(dir.path().join("images"));

    let saved = assets.save_image(None, "Any Name").unwrap();

    assert_eq!(saved, None);
    assert!(!assets.root().exists());
}

#[test]
fn save_derives_filename_from_record_name() {
    let dir = tempfile::tempdir().unwrap();
    let assets = AssetStore::new(dir.path().join("images"));
    let upload = ImageUpload::new("IMG_0042.jpg", vec![0xFF, 0xD8, 0xFF]);

    let saved = assets.save_image(Some(&upload), "Raïna Raï").unwrap();

    assert_eq!(saved.as_deref(), Some("Raïna_Raï.jpg"));
    let written = std::fs::read(assets.root().join("Raïna_Raï.jpg")).unwrap();
    assert_eq!(written, vec![0xFF, 0xD8, 0xFF]);
}

#[test]
fn colliding_names_overwrite_silently() {
    let dir = tempfile::tempdir().unwrap();
    let assets = AssetStore::new(dir.path());

    assets
        .save_image(Some(&ImageUpload::new("a.png", vec![1])), "Same Name")
        .unwrap();
    assets
        .save_image(Some(&ImageUpload::new("b.png", vec![2])), "Same Name")
        .unwrap();

    assert_eq!(std::fs::read(dir.path().join("Same_Name.png")).unwrap(), vec![2]);
}

#[test]
fn resolve_falls_back_to_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let assets = AssetStore::new(dir.path());
    std::fs::write(dir.path().join("Taknara.png"), [1, 2, 3]).unwrap();

    assert_eq!(
        assets.resolve_image(Some("Taknara.png")),
        ImageRef::File(dir.path().join("Taknara.png"))
    );
    assert_eq!(
        assets.resolve_image(Some("missing.png")),
        ImageRef::Placeholder(PLACEHOLDER_IMAGE_URL)
    );
    assert_eq!(
        assets.resolve_image(None),
        ImageRef::Placeholder(PLACEHOLDER_IMAGE_URL)
    );
}

#[test]
fn upload_from_path_keeps_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("cover.jpeg");
    std::fs::write(&source, [9, 9]).unwrap();

    let upload = ImageUpload::from_path(&source).unwrap();

    assert_eq!(upload.file_name, "cover.jpeg");
    assert_eq!(upload.bytes, vec![9, 9]);
}
