//! End-to-end behaviour of the annotation session through its public API.

use face_annotator::state::labels::{EyeColor, HairColor};
use face_annotator::{
    AnnotationStore, AnnotatorError, Command, Outcome, Session, ANNOTATIONS_FILE_NAME,
};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    images: PathBuf,
    output: PathBuf,
    config: PathBuf,
}

impl Fixture {
    fn new(images: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let image_dir = dir.path().join("images");
        let output = dir.path().join("out");
        fs::create_dir_all(&image_dir).unwrap();
        fs::create_dir_all(&output).unwrap();

        for (i, name) in images.iter().enumerate() {
            write_image(&image_dir, name, 40 + i as u32, 30);
        }

        Self {
            images: image_dir,
            output,
            config: dir.path().join("config.json"),
            _dir: dir,
        }
    }

    /// A session with both folders selected
    fn session(&self) -> Session {
        let mut session = Session::open(&self.config);
        session.select_image_folder(&self.images).unwrap();
        session.select_output_folder(&self.output).unwrap();
        session
    }

    fn annotations_path(&self) -> PathBuf {
        self.output.join(ANNOTATIONS_FILE_NAME)
    }
}

fn write_image(dir: &Path, name: &str, width: u32, height: u32) {
    RgbImage::new(width, height).save(dir.join(name)).unwrap();
}

fn names(session: &Session) -> Vec<String> {
    session
        .catalog()
        .entries()
        .iter()
        .map(|entry| entry.filename.clone())
        .collect()
}

#[test]
fn test_catalog_skips_non_images() {
    let fixture = Fixture::new(&["b.png", "a.jpg"]);
    fs::write(fixture.images.join("notes.txt"), "hi").unwrap();

    let session = fixture.session();
    assert_eq!(names(&session), vec!["a.jpg", "b.png"]);
    assert_eq!(session.count(), (0, 2));
}

#[test]
fn test_start_lands_on_first_image() {
    let fixture = Fixture::new(&["a.png", "b.png"]);
    let mut session = fixture.session();

    let current = session.start().unwrap().unwrap();
    assert_eq!(current.index, 0);
    assert_eq!(current.id, "1");
    assert_eq!(current.filename, "a.png");
    assert_eq!(current.dimensions, "40x30");
    assert!(!current.annotated);
    assert_eq!(session.current_path(), Some(fixture.images.join("a.png").as_path()));
    assert!(!session.current_bytes().unwrap().unwrap().is_empty());
}

#[test]
fn test_advance_saves_before_moving() {
    let fixture = Fixture::new(&["a.png", "b.png"]);
    let mut session = fixture.session();
    session.start().unwrap();

    session.draft_mut().hair_color = Some(HairColor::Gray);
    let next = session.advance().unwrap().unwrap();
    assert_eq!(next.filename, "b.png");
    assert!(session.draft().is_unannotated());

    let stored = AnnotationStore::load(&fixture.annotations_path()).unwrap();
    let record = stored.get("a.png").unwrap();
    assert_eq!(record.id, "1");
    assert_eq!(record.filename, "a.png");
    assert_eq!(record.dimensions, "40x30");
    assert_eq!(record.attributes.hair_color, Some(HairColor::Gray));
    assert_eq!(session.config().annotations_file, Some(fixture.annotations_path()));

    // Coming back shows the stored values
    let back = session.retreat().unwrap().unwrap();
    assert!(back.annotated);
    assert_eq!(session.draft().hair_color, Some(HairColor::Gray));
}

#[test]
fn test_empty_save_creates_no_record() {
    let fixture = Fixture::new(&["a.png"]);
    let mut session = fixture.session();
    session.start().unwrap();

    assert!(!session.save().unwrap());
    assert!(session.store().is_empty());
    assert_eq!(session.count(), (0, 1));
    assert!(!fixture.annotations_path().exists());
}

#[test]
fn test_repeated_save_writes_identical_file() {
    let fixture = Fixture::new(&["a.png"]);
    let mut session = fixture.session();
    session.start().unwrap();

    session.draft_mut().beard = true;
    assert!(session.save().unwrap());
    let first = fs::read(fixture.annotations_path()).unwrap();

    assert!(session.save().unwrap());
    assert_eq!(fs::read(fixture.annotations_path()).unwrap(), first);
}

#[test]
fn test_saved_file_loads_back_equal() {
    let fixture = Fixture::new(&["a.png", "b.png"]);
    let mut session = fixture.session();
    session.start().unwrap();
    session.draft_mut().eye_color = Some(EyeColor::Blue);
    session.advance().unwrap();
    session.draft_mut().mustache = true;
    session.save().unwrap();

    let mut reopened = Session::open(&fixture.config);
    assert_eq!(reopened.store(), session.store());

    assert_eq!(reopened.load_annotations(fixture.annotations_path()).unwrap(), 2);
    assert_eq!(reopened.store(), session.store());
}

#[test]
fn test_advance_wraps_after_n_steps() {
    let fixture = Fixture::new(&["a.png", "b.png", "c.png", "d.png"]);
    let mut session = fixture.session();
    session.start().unwrap();
    session.advance().unwrap();

    let start = session.cursor();
    for _ in 0..4 {
        session.advance().unwrap();
    }
    assert_eq!(session.cursor(), start);

    for _ in 0..4 {
        session.retreat().unwrap();
    }
    assert_eq!(session.cursor(), start);
}

#[test]
fn test_omit_removes_from_catalog_and_persists() {
    let fixture = Fixture::new(&["a.png", "b.png", "c.png"]);
    let mut session = fixture.session();
    session.start().unwrap();
    session.advance().unwrap();

    let shown = session.omit_current("eyes closed").unwrap().unwrap();
    assert_eq!(shown.filename, "c.png");
    assert_eq!(shown.id, "2");
    assert_eq!(names(&session), vec!["a.png", "c.png"]);
    assert_eq!(session.omitted(), vec![("b.png", "eyes closed")]);

    // Re-deriving the catalog keeps it out
    session.select_image_folder(&fixture.images).unwrap();
    assert_eq!(names(&session), vec!["a.png", "c.png"]);

    let reopened = Session::open(&fixture.config);
    assert_eq!(names(&reopened), vec!["a.png", "c.png"]);
    assert_eq!(reopened.omitted(), vec![("b.png", "eyes closed")]);
}

#[test]
fn test_omit_saves_draft_under_omitted_image() {
    let fixture = Fixture::new(&["a.png", "b.png"]);
    let mut session = fixture.session();
    session.start().unwrap();

    session.draft_mut().hat = true;
    session.omit_current("").unwrap();

    assert!(session.store().contains("a.png"));
    assert!(!session.store().contains("b.png"));
    assert_eq!(session.omitted(), vec![("a.png", "")]);
    // Record outlives the image's presence in the catalog
    assert_eq!(session.count(), (0, 1));
}

#[test]
fn test_omit_last_image_wraps_then_empties() {
    let fixture = Fixture::new(&["a.png", "b.png"]);
    let mut session = fixture.session();
    session.retreat().unwrap();

    let shown = session.omit_current("dup").unwrap().unwrap();
    assert_eq!(shown.filename, "a.png");

    assert_eq!(session.omit_current("dup").unwrap(), None);
    assert!(session.catalog().is_empty());
    assert_eq!(session.cursor(), None);
    assert_eq!(session.dispatch(Command::Next).unwrap(), Outcome::NoImage);
}

#[test]
fn test_omit_other_image_shifts_current_id() {
    let fixture = Fixture::new(&["a.png", "b.png", "c.png"]);
    let mut session = fixture.session();
    session.start().unwrap();
    session.advance().unwrap();
    session.advance().unwrap();

    session.omit("a.png", "not a face").unwrap();
    let current = session.current().unwrap();
    assert_eq!(current.filename, "c.png");
    assert_eq!(current.index, 1);
    assert_eq!(current.id, "2");
}

#[test]
fn test_jump_to_next_unannotated() {
    let fixture = Fixture::new(&["a.png", "b.png", "c.png"]);
    let mut session = fixture.session();

    // Annotate only the second image
    session.start().unwrap();
    session.advance().unwrap();
    session.draft_mut().hair_color = Some(HairColor::Red);
    session.retreat().unwrap();
    assert_eq!(session.cursor(), Some(0));

    let landed = session.jump_to_next_unannotated().unwrap();
    assert_eq!(landed.index, 2);

    // Annotate the rest
    session.draft_mut().glasses = true;
    session.advance().unwrap();
    session.draft_mut().glasses = true;
    session.save().unwrap();

    assert_eq!(session.count(), (3, 3));
    assert_eq!(session.dispatch(Command::NextUnannotated).unwrap(), Outcome::AllAnnotated);
    assert_eq!(session.cursor(), Some(0));
}

#[test]
fn test_load_annotations_keeps_unsaved_draft() {
    let fixture = Fixture::new(&["a.png", "b.png"]);
    let mut session = fixture.session();
    session.start().unwrap();
    session.draft_mut().hair_color = Some(HairColor::Red);

    let other = fixture.output.join("other.json");
    fs::write(&other, r#"{"a.png": {"id": "1", "filename": "a.png", "beard": true}}"#).unwrap();

    assert_eq!(session.load_annotations(&other).unwrap(), 1);
    assert_eq!(session.draft().hair_color, Some(HairColor::Red));
    assert!(!session.draft().beard);
    assert!(session.current().unwrap().annotated);
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_keeps_image_folder() {
    let fixture = Fixture::new(&["a.png", "b.png"]);
    std::os::unix::fs::symlink(fixture.images.join("gone.png"), fixture.images.join("link.png"))
        .unwrap();

    let session = fixture.session();
    assert_eq!(session.config().image_folder, Some(fixture.images.clone()));
    assert_eq!(names(&session), vec!["a.png", "b.png"]);
}

#[test]
fn test_search_by_name_or_stored_id() {
    let fixture = Fixture::new(&["a1.png", "b2.jpg"]);
    fs::write(
        fixture.annotations_path(),
        r#"{"a1.png": {"id": "7", "filename": "a1.png", "dimensions": "40x30", "hair_color": "black"}}"#,
    )
    .unwrap();

    let mut session = fixture.session();
    session.load_annotations(fixture.annotations_path()).unwrap();

    // Searching does not save, so the stored id stays "7"
    assert_eq!(session.search("7").unwrap().index, 0);
    assert_eq!(session.search("B2").unwrap().index, 1);
    assert_eq!(session.search("A1").unwrap().index, 0);
    assert_eq!(session.store().get("a1.png").unwrap().id, "7");

    assert_eq!(
        session.dispatch(Command::Search("zzz".into())).unwrap(),
        Outcome::NotFound
    );
    assert_eq!(session.cursor(), Some(0));
}

#[test]
fn test_statistics_merge_same_word() {
    let fixture = Fixture::new(&["a.png", "b.png"]);
    let mut session = fixture.session();
    session.start().unwrap();
    session.draft_mut().hair_color = Some(HairColor::Black);
    session.advance().unwrap();
    session.draft_mut().eye_color = Some(EyeColor::Black);
    session.save().unwrap();

    let Outcome::Statistics(stats) = session.dispatch(Command::UpdateStatistics).unwrap() else {
        panic!("expected statistics");
    };
    assert_eq!(stats.total, 2);
    assert_eq!(stats.percentage("black"), Some(100.0));
}

#[test]
fn test_invalid_annotations_file_keeps_store() {
    let fixture = Fixture::new(&["a.png"]);
    let mut session = fixture.session();
    session.start().unwrap();
    session.draft_mut().beard = true;
    session.save().unwrap();

    let broken = fixture.output.join("broken.json");
    fs::write(&broken, r#"{"a.png": {"hair_color": "teal"}}"#).unwrap();

    let err = session.load_annotations(&broken).unwrap_err();
    assert!(matches!(err, AnnotatorError::InvalidFormat { .. }));
    assert!(session.store().contains("a.png"));
    assert_eq!(session.config().annotations_file, Some(fixture.annotations_path()));
}

#[test]
fn test_save_without_output_folder_stays_in_memory() {
    let fixture = Fixture::new(&["a.png"]);
    let mut session = Session::open(&fixture.config);
    session.select_image_folder(&fixture.images).unwrap();
    session.advance().unwrap();

    session.draft_mut().hat = true;
    assert!(session.save().unwrap());
    assert!(session.store().contains("a.png"));
    assert!(!fixture.annotations_path().exists());
    assert_eq!(session.config().annotations_file, None);
}

#[test]
fn test_startup_recovers_from_vanished_folder_and_bad_config() {
    let fixture = Fixture::new(&["a.png"]);
    {
        let session = fixture.session();
        session.close().unwrap();
    }
    fs::remove_dir_all(&fixture.images).unwrap();

    let session = Session::open(&fixture.config);
    assert!(session.catalog().is_empty());
    assert_eq!(session.config().image_folder, None);
    assert!(matches!(
        session.startup_errors(),
        [AnnotatorError::FolderNotFound(_)]
    ));

    fs::write(&fixture.config, "not json").unwrap();
    let session = Session::open(&fixture.config);
    assert_eq!(session.config(), &Default::default());
    assert!(matches!(
        session.startup_errors(),
        [AnnotatorError::InvalidFormat { .. }]
    ));
}

#[test]
fn test_previews_frame_by_status() {
    let fixture = Fixture::new(&["a.png", "b.png"]);
    let mut session = fixture.session();
    session.start().unwrap();

    let preview = session.current_preview().unwrap().unwrap();
    assert_eq!(preview.dimensions(), (50, 40));
    assert_eq!(*preview.get_pixel(0, 0), face_annotator::imaging::UNANNOTATED_COLOR);

    session.omit_current("blurry").unwrap();
    let omitted = session.omitted_preview("a.png").unwrap().unwrap();
    assert_eq!(omitted.dimensions(), (40, 30));
    assert!(session.omitted_preview("b.png").unwrap().is_none());
}
