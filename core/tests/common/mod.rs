//! Shared fixtures: a mock shelter on an ephemeral port and photo files.

use std::path::PathBuf;

use mock_server::Account;
use petfriends_core::{AuthKey, PetFriends, PetFilter, PetList};

pub const VALID_EMAIL: &str = "tester@petfriends.test";
pub const VALID_PASSWORD: &str = "s3cret-pass";

/// Start the mock shelter on a random port and return its base URL.
pub fn spawn_shelter() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, vec![Account::new(VALID_EMAIL, VALID_PASSWORD)]).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// A client against a fresh shelter, already holding a valid key.
pub struct Fixture {
    pub pf: PetFriends,
    pub key: AuthKey,
}

impl Fixture {
    pub fn new() -> Self {
        let pf = PetFriends::new(&spawn_shelter());
        let key = pf.auth_key(VALID_EMAIL, VALID_PASSWORD).unwrap();
        Self { pf, key }
    }

    pub fn my_pets(&self) -> PetList {
        self.pf
            .get_list_of_pets(&self.key, &PetFilter::MyPets)
            .unwrap()
            .decode()
            .unwrap()
    }

    /// Create a pet without a photo and return its id.
    pub fn create_pet(&self, name: &str) -> String {
        let resp = self
            .pf
            .add_new_pet_simple(&self.key, name, "кот", "3")
            .unwrap();
        assert_eq!(resp.status, 200);
        resp.body.as_json().unwrap()["id"].as_str().unwrap().to_string()
    }
}

/// Write a small JPEG-looking file to the temp dir and return its path.
pub fn photo_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}-{name}", uuid::Uuid::new_v4()));
    std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0xFF, 0xD9]).unwrap();
    path
}

/// Write a `len`-byte photo with a JPEG header to the temp dir and return its path.
pub fn large_photo_file(name: &str, len: usize) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}-{name}", uuid::Uuid::new_v4()));
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.extend((0..len.saturating_sub(4)).map(|i| (i % 251) as u8));
    std::fs::write(&path, data).unwrap();
    path
}
