//! Integration tests for Quire

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Isolated site root, config file and state directory
    struct Site {
        temp: TempDir,
    }

    impl Site {
        fn new() -> Self {
            Self {
                temp: TempDir::new().unwrap(),
            }
        }

        fn root(&self) -> PathBuf {
            self.temp.path().join("site")
        }

        fn config(&self) -> PathBuf {
            self.temp.path().join("config.toml")
        }

        fn state(&self) -> PathBuf {
            self.temp.path().join("state")
        }

        fn path(&self) -> &Path {
            self.temp.path()
        }

        fn cmd(&self) -> Command {
            let mut cmd = quire();
            cmd.current_dir(self.temp.path())
                .env("QUIRE_CONFIG", self.config())
                .env("QUIRE_STATE_DIR", self.state())
                .arg("--no-local")
                .arg("--root")
                .arg(self.root());
            cmd
        }

        fn login(&self) {
            self.cmd()
                .args(["passwd", "--password", "s3cret"])
                .assert()
                .success();
            self.cmd()
                .args(["login", "--password", "s3cret"])
                .assert()
                .success()
                .stdout(predicate::str::contains("Logged in"));
        }
    }

    fn quire() -> Command {
        let mut cmd = cargo_bin_cmd!("quire");
        cmd.env_remove("QUIRE_CONFIG")
            .env_remove("QUIRE_PASSWORD")
            .env_remove("QUIRE_LOG_FORMAT")
            .env_remove("QUIRE_STATE_DIR");
        cmd
    }

    #[test]
    fn help_displays() {
        quire()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("flat-file blog post store"));
    }

    #[test]
    fn version_displays() {
        quire()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("quire"));
    }

    #[test]
    fn list_empty_site() {
        let site = Site::new();
        site.cmd()
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No posts found"));

        site.cmd()
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn mutation_requires_login() {
        let site = Site::new();
        site.cmd()
            .args(["new", "--title", "Hello"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Admin login required"))
            .stderr(predicate::str::contains("quire login"));

        assert!(!site.root().join("posts.json").exists());
    }

    #[test]
    fn login_without_password_configured() {
        let site = Site::new();
        site.cmd()
            .args(["login", "--password", "anything"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("quire passwd"));
    }

    #[test]
    fn login_with_wrong_password() {
        let site = Site::new();
        site.cmd()
            .args(["passwd", "--password", "s3cret"])
            .assert()
            .success();
        site.cmd()
            .args(["login", "--password", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid password"));
    }

    #[test]
    fn post_lifecycle() {
        let site = Site::new();
        site.login();

        site.cmd()
            .args([
                "new",
                "--title",
                "Hello World",
                "--tags",
                "rust, web",
                "--content",
                "<p>Hi</p>",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Post added successfully!"))
            .stdout(predicate::str::contains("hello-world"));

        site.cmd()
            .args(["new", "--title", "Hello World", "--content", "<p>Again</p>"])
            .assert()
            .success()
            .stdout(predicate::str::contains("hello-world-1"));

        assert!(site.root().join("posts").join("hello-world.html").exists());
        assert!(site.root().join("posts").join("hello-world-1.html").exists());

        site.cmd()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout("hello-world-1\nhello-world\n");

        site.cmd()
            .args(["show", "hello-world", "--content", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("<p>Hi</p>"));

        site.cmd()
            .args(["search", "web", "--format", "plain"])
            .assert()
            .success()
            .stdout("hello-world\n");

        site.cmd()
            .args(["move", "hello-world-1", "up"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already first"));

        site.cmd()
            .args(["move", "hello-world-1", "down"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Post moved down successfully!"));

        site.cmd()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout("hello-world\nhello-world-1\n");

        site.cmd()
            .args(["edit", "hello-world", "--title", "Goodbye"])
            .assert()
            .success()
            .stdout(predicate::str::contains("goodbye"));

        assert!(!site.root().join("posts").join("hello-world.html").exists());
        let moved = std::fs::read_to_string(site.root().join("posts").join("goodbye.html")).unwrap();
        assert_eq!(moved, "<p>Hi</p>");

        site.cmd()
            .args(["delete", "goodbye", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Post deleted successfully!"));

        site.cmd()
            .args(["show", "goodbye"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No post with slug 'goodbye'"));

        site.cmd()
            .arg("stats")
            .assert()
            .success()
            .stdout(predicate::str::contains("posts: 1"));
    }

    #[test]
    fn logout_blocks_further_mutations() {
        let site = Site::new();
        site.login();

        site.cmd()
            .arg("logout")
            .assert()
            .success()
            .stdout(predicate::str::contains("Logged out"));

        site.cmd()
            .arg("shuffle")
            .arg("--yes")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Admin login required"));
    }

    #[test]
    fn upload_and_list_images() {
        let site = Site::new();
        site.login();

        let source = site.path().join("My Pic.png");
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0u8; 32]);
        std::fs::write(&source, bytes).unwrap();

        site.cmd()
            .arg("upload")
            .arg(&source)
            .assert()
            .success()
            .stdout(predicate::str::contains("Image uploaded successfully!"));

        site.cmd()
            .args(["images", "--format", "plain"])
            .assert()
            .success()
            .stdout("My_Pic.png\n");

        let fake = site.path().join("notes.png");
        std::fs::write(&fake, "plain text").unwrap();
        site.cmd().arg("upload").arg(&fake).assert().failure();
    }

    #[test]
    fn cache_status_and_clear() {
        let site = Site::new();
        site.cmd()
            .args(["cache", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("absent"));

        site.cmd().arg("list").assert().success();

        site.cmd()
            .args(["cache", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("fresh"));

        site.login();
        site.cmd()
            .args(["cache", "clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache cleared successfully!"));
        assert!(!site.root().join("cache").join("posts.cache").exists());
    }

    #[test]
    fn config_set_and_show() {
        let site = Site::new();
        site.cmd()
            .args(["config", "set", "site.title", "My Notebook"])
            .assert()
            .success();

        site.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("My Notebook"));

        site.cmd()
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn config_path() {
        let site = Site::new();
        site.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn completions_generate() {
        quire()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("quire"));
    }
}
