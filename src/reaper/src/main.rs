// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Deletes stale Compute Engine resources created by sample tests.

const DESCRIPTION: &str = concat!(
    "Deletes VMs, instance templates, and reservations whose name contains",
    " the given prefix and that were created more than --max-age-hours ago.",
    " VMs are only deleted if they are running. Reservations are listed in a",
    " single zone, chosen at random from $TEST_ZONES unless --zone is set.",
    " The sweeps run one after the other and the program stops at the first",
    " error."
);

use chrono::TimeDelta;
use clap::{Parser, ValueEnum};
use google_cloud_test_reaper::compute::ComputeClients;
use google_cloud_test_reaper::config::ReaperConfig;
use google_cloud_test_reaper::{Reaper, SweepSummary};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    enable_tracing()?;

    let args = Args::parse();
    tracing::info!("{args:?}");
    let config = ReaperConfig::from_env().set_age_threshold(args.age_threshold());
    let Some(project) = args.project.clone().or_else(|| config.project_id.clone()) else {
        return Err(anyhow::Error::msg(
            "missing project, use --project or set $GOOGLE_CLOUD_PROJECT",
        ));
    };
    let zone = args.zone.clone().unwrap_or_else(|| config.random_zone());

    let clients = ComputeClients::new().await?;
    let reaper = Reaper::new(clients.clone(), clients).with_config(&config);
    for kind in args.kinds() {
        let summary = match kind {
            Kind::Instances => reaper.reap_instances(&args.prefix, &project, &zone).await?,
            Kind::InstanceTemplates => {
                reaper
                    .reap_instance_templates(&args.prefix, &project)
                    .await?
            }
            Kind::Reservations => {
                reaper
                    .reap_reservations(&args.prefix, &project, &zone)
                    .await?
            }
        };
        println!("{}", report(&summary));
    }
    tracing::info!("DONE");
    Ok(())
}

fn report(summary: &SweepSummary) -> String {
    format!(
        "{}: examined={} deleted={} already_gone={} {:?}",
        summary.kind,
        summary.examined,
        summary.deleted.len(),
        summary.not_found.len(),
        summary.deleted
    )
}

fn enable_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_level(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Instances,
    InstanceTemplates,
    Reservations,
}

/// Deletes stale test resources from a Google Cloud project.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = DESCRIPTION)]
struct Args {
    /// The project to clean up.
    ///
    /// Defaults to the value of `$GOOGLE_CLOUD_PROJECT`.
    #[arg(long)]
    project: Option<String>,

    /// Only resources whose name contains this string are deleted.
    #[arg(long)]
    prefix: String,

    /// The zone used for reservations, and for VMs whose zone is not
    /// reported by the listing.
    #[arg(long)]
    zone: Option<String>,

    /// The kind of resource to clean up. Can be repeated, defaults to all.
    #[arg(long = "kind", value_enum)]
    kinds: Vec<Kind>,

    /// Resources created less than this many hours ago are kept. Must be at
    /// least 1.
    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..))]
    max_age_hours: u32,
}

impl Args {
    fn kinds(&self) -> Vec<Kind> {
        if self.kinds.is_empty() {
            return vec![Kind::Instances, Kind::InstanceTemplates, Kind::Reservations];
        }
        self.kinds.clone()
    }

    fn age_threshold(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.max_age_hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use google_cloud_test_reaper::model::ResourceKind;
    use test_case::test_case;

    #[test]
    fn command() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() -> anyhow::Result<()> {
        let args = Args::try_parse_from(["reaper", "--prefix", "test-"])?;
        assert_eq!(args.prefix, "test-");
        assert_eq!(args.project, None);
        assert_eq!(args.zone, None);
        assert_eq!(args.max_age_hours, 24);
        assert_eq!(args.age_threshold(), TimeDelta::hours(24));
        assert_eq!(
            args.kinds(),
            vec![Kind::Instances, Kind::InstanceTemplates, Kind::Reservations]
        );
        Ok(())
    }

    #[test]
    fn kinds() -> anyhow::Result<()> {
        let args = Args::try_parse_from([
            "reaper",
            "--prefix",
            "test-",
            "--kind",
            "instance-templates",
            "--kind",
            "reservations",
            "--zone",
            "us-west1-a",
            "--project",
            "p",
            "--max-age-hours",
            "2",
        ])?;
        assert_eq!(args.kinds(), vec![Kind::InstanceTemplates, Kind::Reservations]);
        assert_eq!(args.zone.as_deref(), Some("us-west1-a"));
        assert_eq!(args.project.as_deref(), Some("p"));
        assert_eq!(args.max_age_hours, 2);
        assert_eq!(args.age_threshold(), TimeDelta::hours(2));
        Ok(())
    }

    #[test_case("-1000"; "negative")]
    #[test_case("0"; "zero")]
    #[test_case("9223372036854775807"; "overflows")]
    #[test_case("abc"; "not a number")]
    fn bad_max_age(value: &str) {
        let got =
            Args::try_parse_from(["reaper", "--prefix", "p", "--max-age-hours", value]);
        assert!(got.is_err(), "{got:?}");
    }

    #[test]
    fn largest_max_age() -> anyhow::Result<()> {
        let max = u32::MAX.to_string();
        let args =
            Args::try_parse_from(["reaper", "--prefix", "p", "--max-age-hours", max.as_str()])?;
        assert_eq!(args.age_threshold(), TimeDelta::hours(i64::from(u32::MAX)));
        Ok(())
    }

    #[test]
    fn missing_prefix() {
        let got = Args::try_parse_from(["reaper"]);
        assert!(got.is_err(), "{got:?}");
        let got = Args::try_parse_from(["reaper", "--prefix", "p", "--kind", "disks"]);
        assert!(got.is_err(), "{got:?}");
    }

    #[test]
    fn summary_line() {
        let summary = SweepSummary::new(ResourceKind::Reservation)
            .set_examined(3)
            .set_deleted(["r-1"])
            .set_not_found(["r-2"]);
        let got = report(&summary);
        assert_eq!(
            got,
            r#"reservation: examined=3 deleted=1 already_gone=1 ["r-1"]"#
        );
    }
}
