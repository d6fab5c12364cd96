use chrono::NaiveDate;
use prontuario_core::domain::{AttachmentKind, Patient, Practitioner};
use prontuario_core::form::PatientForm;
use prontuario_store::error::StoreErrorKind;
use prontuario_store::files;
use prontuario_store::repo::{AttachmentNew, PractitionerNew};
use prontuario_store::Store;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn setup() -> (Store, Practitioner, Patient) {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    let owner = store
        .practitioners()
        .create(
            1,
            PractitionerNew {
                username: "drsilva".to_string(),
                display_name: None,
            },
        )
        .expect("create practitioner");
    let input = PatientForm {
        full_name: "Ana Souza".to_string(),
        birth_date: "1985-04-20".to_string(),
        cpf: "11144477735".to_string(),
        sex: "F".to_string(),
        phone: "11998765432".to_string(),
        address: "Rua das Flores, 10".to_string(),
        city: "Campinas".to_string(),
        state: "SP".to_string(),
        cep: "13010000".to_string(),
        ..Default::default()
    }
    .validate(NaiveDate::from_ymd_opt(2024, 6, 10).expect("date"))
    .expect("valid form");
    let patient = store
        .patients()
        .create(2, owner.id, input)
        .expect("create patient");
    (store, owner, patient)
}

fn write_source(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"payload").expect("write source");
    path
}

#[test]
fn attachments_are_copied_and_listed_newest_first() {
    let (store, owner, patient) = setup();
    let temp = TempDir::new().expect("temp dir");
    let root = temp.path().join("attachments");

    let document = store
        .attachments()
        .add(
            1_700_000_000,
            owner.id,
            &root,
            AttachmentNew {
                patient_id: patient.id,
                kind: AttachmentKind::Document,
                title: "  Hemograma ".to_string(),
                description: String::new(),
                source: write_source(temp.path(), "hemograma.PDF"),
            },
        )
        .expect("add document");
    assert_eq!(document.title, "Hemograma");
    assert!(document.file_path.starts_with("documents/"));
    assert!(document.file_path.ends_with(".pdf"));
    assert!(files::absolute_path(&root, &document.file_path).exists());

    let photo = store
        .attachments()
        .add(
            1_700_000_100,
            owner.id,
            &root,
            AttachmentNew {
                patient_id: patient.id,
                kind: AttachmentKind::Photo,
                title: "Lesão".to_string(),
                description: "antebraço".to_string(),
                source: write_source(temp.path(), "lesao.jpg"),
            },
        )
        .expect("add photo");
    assert!(photo.file_path.starts_with("photos/"));

    let listed = store
        .attachments()
        .list_for_patient(owner.id, patient.id)
        .expect("list");
    let ids: Vec<_> = listed.iter().map(|attachment| attachment.id).collect();
    assert_eq!(ids, vec![photo.id, document.id]);
}

#[test]
fn wrong_extension_or_title_is_rejected_without_copy() {
    let (store, owner, patient) = setup();
    let temp = TempDir::new().expect("temp dir");
    let root = temp.path().join("attachments");

    let err = store
        .attachments()
        .add(
            1,
            owner.id,
            &root,
            AttachmentNew {
                patient_id: patient.id,
                kind: AttachmentKind::Document,
                title: "Receita".to_string(),
                description: String::new(),
                source: write_source(temp.path(), "receita.docx"),
            },
        )
        .expect_err("docx is not allowed");
    assert_eq!(err.kind(), StoreErrorKind::Core);

    let err = store
        .attachments()
        .add(
            1,
            owner.id,
            &root,
            AttachmentNew {
                patient_id: patient.id,
                kind: AttachmentKind::Photo,
                title: "   ".to_string(),
                description: String::new(),
                source: write_source(temp.path(), "foto.png"),
            },
        )
        .expect_err("title required");
    assert_eq!(err.kind(), StoreErrorKind::Core);
    assert!(!root.exists());
}

#[test]
fn other_practitioners_cannot_touch_attachments() {
    let (store, owner, patient) = setup();
    let other = store
        .practitioners()
        .create(
            3,
            PractitionerNew {
                username: "drasouza".to_string(),
                display_name: None,
            },
        )
        .expect("create other");
    let temp = TempDir::new().expect("temp dir");
    let root = temp.path().join("attachments");

    let err = store
        .attachments()
        .add(
            4,
            other.id,
            &root,
            AttachmentNew {
                patient_id: patient.id,
                kind: AttachmentKind::Document,
                title: "Exame".to_string(),
                description: String::new(),
                source: write_source(temp.path(), "exame.pdf"),
            },
        )
        .expect_err("not owner");
    assert_eq!(err.kind(), StoreErrorKind::NotFound);

    let attachment = store
        .attachments()
        .add(
            5,
            owner.id,
            &root,
            AttachmentNew {
                patient_id: patient.id,
                kind: AttachmentKind::Document,
                title: "Exame".to_string(),
                description: String::new(),
                source: write_source(temp.path(), "exame.pdf"),
            },
        )
        .expect("add");
    let err = store
        .attachments()
        .delete(other.id, attachment.id)
        .expect_err("not owner");
    assert_eq!(err.kind(), StoreErrorKind::NotFound);

    let removed = store
        .attachments()
        .delete(owner.id, attachment.id)
        .expect("delete");
    assert_eq!(removed.id, attachment.id);
    assert!(store
        .attachments()
        .get_for_owner(owner.id, attachment.id)
        .expect("get")
        .is_none());
}

#[test]
fn deleting_patient_returns_its_attachments() {
    let (store, owner, patient) = setup();
    let temp = TempDir::new().expect("temp dir");
    let root = temp.path().join("attachments");
    let attachment = store
        .attachments()
        .add(
            5,
            owner.id,
            &root,
            AttachmentNew {
                patient_id: patient.id,
                kind: AttachmentKind::Photo,
                title: "Raio-X".to_string(),
                description: String::new(),
                source: write_source(temp.path(), "raiox.gif"),
            },
        )
        .expect("add");

    let removed = store
        .patients()
        .delete(owner.id, patient.id)
        .expect("delete patient");
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].id, attachment.id);
    assert!(store
        .attachments()
        .get_for_owner(owner.id, attachment.id)
        .expect("get")
        .is_none());
}
