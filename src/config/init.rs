// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Writes a deploy.yml describing the tournament platform's four proxies.

use std::path::Path;

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

/// Render the starter configuration.
///
/// Without an RPC URL the template targets the simulated backend, so a fresh
/// project can `plan` and dry-run `deploy` straight away.
pub fn template_yaml(network: &str, rpc_url: Option<&str>) -> String {
    let backend = match rpc_url {
        Some(url) => format!("  backend: rpc\n  rpc_url: {url}\n"),
        None => "  backend: simulated\n  # rpc_url: http://127.0.0.1:8600\n".to_string(),
    };

    format!(
        r#"network:
  name: {network}
{backend}  call_timeout: 2m

ledger: deployed-addresses.json

components:
  - name: governance
    contract: PlatformGovernance
    init_args:
      - ["0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"]
    post_links:
      - method: initAddress
        args: [{{ ref: fencer }}, {{ ref: tournament }}]
        checks:
          - getter: fencerContract
            expect: {{ ref: fencer }}
          - getter: tournamentContract
            expect: {{ ref: tournament }}

  - name: fencer
    contract: Fencer
    init_args: [{{ ref: governance }}]

  - name: tournament
    contract: Tournament
    init_args: [{{ ref: governance }}, {{ ref: fencer }}]
    post_links:
      - method: setAchievementSBT
        args: [{{ ref: achievementSBT }}]
        checks:
          - getter: achievementSBT
            expect: {{ ref: achievementSBT }}

  - name: achievementSBT
    contract: AchievementSBT
    init_args: [{{ ref: governance }}, {{ ref: tournament }}]

# Runs once, on a fresh deployment only.
seed:
  - component: tournament
    method: createTournament
    args:
      - Кубок Ростова
      - {{ env: TOURNAMENT_CID, default: "" }}
      - 0
      - 0
      - 1718640000
      - 3600
      - payload:
          schema: nominations
          records:
            - {{ nameId: 0, max: 16, participants: [], winners: [], badgeURI: "", weaponId: 0, gender: 0 }}
            - {{ nameId: 1, max: 20, participants: [], winners: [], badgeURI: "", weaponId: 0, gender: 0 }}
  - component: fencer
    method: addCity
    args: [Ростов]
  - component: fencer
    method: addCountry
    args: [Россия]
  - component: tournament
    method: addJudge
    args: ["0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266", 0]
  - component: fencer
    method: addClub
    args: [HEMA TEAM]
  - component: fencer
    method: addUser
    args: [Артём, 0, 0, 0, 0]
  - component: fencer
    method: addWeaponRating
    args: [0, 0]
  - component: tournament
    method: registerParticipant
    args: [0, 0]
"#
    )
}

pub fn init_config(
    dir: &Path,
    network: Option<&str>,
    rpc_url: Option<&str>,
    force: bool,
) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = template_yaml(network.unwrap_or("localhost"), rpc_url);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}
