use once_cell::sync::OnceCell;
use sysinfo::System;

const APPLICATION_NAME: &str = "aquabridge";

/// Identity presented to upstream servers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientIdentity {
    pub application_uri: String,
    pub client_id: String,
}

impl ClientIdentity {
    pub fn generate() -> Self {
        let host = System::host_name().unwrap_or_else(|| "localhost".to_string());
        ClientIdentity {
            application_uri: format!("urn:{host}:{APPLICATION_NAME}:client"),
            client_id: get_rand_client_id(Some(APPLICATION_NAME)),
        }
    }
}

pub fn get_rand_client_id(prefix: Option<&str>) -> String {
    const RAND_ID_BYTES: usize = 3;
    let rand: [u8; RAND_ID_BYTES] = rand::random();
    let randhex = hex::encode(rand);

    if let Some(pref) = prefix {
        format!("{pref}-{randhex}")
    } else {
        randhex
    }
}

/// Lazily generated identity shared by every worker of one driver
#[derive(Debug, Default)]
pub struct IdentityStore {
    identity: OnceCell<ClientIdentity>,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &ClientIdentity {
        self.identity.get_or_init(|| {
            let identity = ClientIdentity::generate();
            log::info!(
                "Generated client identity {} ({})",
                identity.client_id,
                identity.application_uri
            );
            identity
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.identity.get().is_some()
    }
}
