use clap::{Parser, Subcommand, ValueEnum};

use crate::resolver::SPRING_BOOT_APPLICATION;

#[derive(Debug, Clone, Parser)]
#[command(name = "class-scanner")]
#[command(about = "List class and resource names reachable on a JVM classpath")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Classpath in the platform path-list format; defaults to $CLASSPATH
    #[arg(long, visible_alias = "cp", value_name = "PATHS")]
    pub classpath: Option<String>,

    /// Name fragment marking generated classes (repeatable, default "__")
    #[arg(long = "synthetic-marker", value_name = "MARKER")]
    pub synthetic_markers: Vec<String>,

    #[arg(long)]
    pub parallel: bool,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Classes under one or more packages
    Units {
        #[arg(required = true, value_name = "PACKAGE")]
        packages: Vec<String>,
    },
    /// Every class on the classpath
    AllUnits {
        #[arg(long)]
        unfiltered: bool,
    },
    /// Non-class resources, optionally under a package
    Resources {
        #[arg(value_name = "PACKAGE")]
        package: Option<String>,
    },
    /// Classes carrying a runtime-visible annotation, synthetic ones included
    Annotated {
        #[arg(value_name = "ANNOTATION", default_value = SPRING_BOOT_APPLICATION)]
        annotation: String,
    },
    /// Classes exposing a main method
    EntryPoints {
        #[arg(long)]
        packages: bool,

        #[arg(long)]
        descriptors_only: bool,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
