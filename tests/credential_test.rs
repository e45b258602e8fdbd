//! Tests for credential storage and the startup credential check.

use strictly_ox::{
    Credential, CredentialLifecycle, CredentialSource, CredentialStore, FileCredentialStore,
    GameSession, MemoryCredentialStore, SessionPhase,
};

#[test]
fn test_credential_debug_is_redacted() {
    let credential = Credential::parse("super-secret").unwrap();
    let printed = format!("{:?}", credential);
    assert!(!printed.contains("super-secret"));
    assert_eq!(credential.expose(), "super-secret");
}

#[test]
fn test_file_store_round_trip_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("nested").join("credential"));

    assert!(store.load().unwrap().is_none());

    store.save(&Credential::parse("tok-1").unwrap()).unwrap();
    assert_eq!(store.load().unwrap().unwrap().expose(), "tok-1");

    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
    // Clearing twice is fine.
    store.clear().unwrap();
}

#[cfg(unix)]
#[test]
fn test_file_store_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("credential"));
    store.save(&Credential::parse("tok").unwrap()).unwrap();

    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_file_store_ignores_blank_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credential");
    std::fs::write(&path, "  \n").unwrap();

    let store = FileCredentialStore::new(&path);
    assert!(store.load().unwrap().is_none());
}

#[test]
fn test_session_recovers_credential_across_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credential");

    let mut first = GameSession::new(Box::new(FileCredentialStore::new(&path)));
    first.load_credential("tok-restart").unwrap();
    drop(first);

    let mut second = GameSession::new(Box::new(FileCredentialStore::new(&path)));
    assert!(second.recover_credential());
    assert_eq!(second.credential().as_ref().unwrap().expose(), "tok-restart");
    assert_eq!(*second.phase(), SessionPhase::NotStarted);
}

#[test]
fn test_logout_evicts_stored_credential() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credential");

    let mut session = GameSession::new(Box::new(FileCredentialStore::new(&path)));
    session.load_credential("tok").unwrap();
    assert!(path.exists());

    session.clear_credential();
    assert!(!path.exists());

    let mut restarted = GameSession::new(Box::new(FileCredentialStore::new(&path)));
    assert!(!restarted.recover_credential());
}

#[test]
fn test_bootstrap_prefers_landing_url() {
    let store = MemoryCredentialStore::with_credential(Credential::parse("old").unwrap());
    let mut session = GameSession::new(Box::new(store.clone()));
    let mut lifecycle = CredentialLifecycle::new();
    assert!(!lifecycle.is_loaded());

    let bootstrap = lifecycle
        .bootstrap(
            &mut session,
            Some("http://localhost:3001/?token=fresh&lang=th"),
            Some("explicit"),
        )
        .unwrap();

    assert!(lifecycle.is_loaded());
    assert_eq!(*bootstrap.source(), CredentialSource::LandingUrl);
    assert_eq!(
        bootstrap.cleaned_location().as_deref(),
        Some("http://localhost:3001/?lang=th")
    );
    assert_eq!(session.credential().as_ref().unwrap().expose(), "fresh");
    assert_eq!(store.snapshot().unwrap().expose(), "fresh");
}

#[test]
fn test_bootstrap_falls_back_to_explicit_then_stored() {
    let store = MemoryCredentialStore::with_credential(Credential::parse("stored").unwrap());

    let mut explicit = GameSession::new(Box::new(store.clone()));
    let bootstrap = CredentialLifecycle::new()
        .bootstrap(&mut explicit, Some("http://localhost:3001/"), Some("pasted"))
        .unwrap();
    assert_eq!(*bootstrap.source(), CredentialSource::Explicit);
    assert_eq!(explicit.credential().as_ref().unwrap().expose(), "pasted");

    let mut stored = GameSession::new(Box::new(store.clone()));
    let bootstrap = CredentialLifecycle::new()
        .bootstrap(&mut stored, None, None)
        .unwrap();
    assert_eq!(*bootstrap.source(), CredentialSource::Stored);
    assert_eq!(stored.credential().as_ref().unwrap().expose(), "pasted");
}

#[test]
fn test_bootstrap_without_any_credential_stays_locked() {
    let mut session = GameSession::new(Box::new(MemoryCredentialStore::new()));
    let mut lifecycle = CredentialLifecycle::new();

    let bootstrap = lifecycle
        .bootstrap(&mut session, Some("not a url"), Some("  "))
        .unwrap();

    assert_eq!(*bootstrap.source(), CredentialSource::None);
    assert!(bootstrap.cleaned_location().is_none());
    assert!(!session.has_credential());
    assert!(lifecycle.is_loaded());
}

#[test]
fn test_bootstrap_runs_once() {
    let mut session = GameSession::new(Box::new(MemoryCredentialStore::new()));
    let mut lifecycle = CredentialLifecycle::new();

    lifecycle.bootstrap(&mut session, None, None).unwrap();
    let second = lifecycle.bootstrap(&mut session, None, Some("late-token"));

    assert!(second.is_none());
    assert!(!session.has_credential());
}

#[test]
fn test_credential_kept_verbatim() {
    let credential = Credential::parse(" tok en\t").unwrap();
    assert_eq!(credential.expose(), " tok en\t");
    assert!(Credential::parse(" \t\n").is_none());
}

#[test]
fn test_file_store_drops_trailing_newline_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credential");
    std::fs::write(&path, "abc.def \r\n").unwrap();

    let store = FileCredentialStore::new(&path);
    assert_eq!(store.load().unwrap().unwrap().expose(), "abc.def ");
}

#[cfg(unix)]
#[test]
fn test_file_store_restricts_existing_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credential");
    std::fs::write(&path, "a-much-longer-previous-token").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let store = FileCredentialStore::new(&path);
    store.save(&Credential::parse("tok-2").unwrap()).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "tok-2");
}
