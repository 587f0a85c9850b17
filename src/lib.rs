//! # fmriflow - Neuroimaging Workflow Graph Construction
//!
//! **fmriflow** declares the shape of neuroimaging analysis pipelines as
//! in-memory directed acyclic graphs. Every node wraps one external
//! command-line tool invocation (FSL or AFNI) with named input and output
//! ports; edges bind a producer port to a consumer port, optionally through a
//! pure, auditable transform. The crate builds and inspects graphs - an
//! external workflow engine owns scheduling, process execution, caching and
//! failure recovery.
//!
//! ## Core Workflow
//!
//! 1.  **Build**: call a pipeline builder ([`create_seg_preproc`] or
//!     [`create_sca`]) to obtain a fully wired [`Graph`].
//! 2.  **Bind**: set values (file paths, scalars, lists) on the graph's input
//!     ports. Lists bound to mapped or swept ports fan out downstream.
//! 3.  **Inspect**: run [`analysis`] queries - topological order, path
//!     lengths, fan-out cardinality, structural isomorphism - or render the
//!     graph to DOT.
//! 4.  **Hand off**: serialize the artifact (or pass the graph object) to the
//!     execution engine.
//!
//! ## Quick Start
//!
//! ```rust
//! use fmriflow::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // Build the seed correlation graph, extracting in native space.
//!     let mut graph = create_sca(ExtractionSpace::Native)?;
//!
//!     // Bind the external inputs the engine will need.
//!     let inputspec = graph.find("inputspec").unwrap();
//!     graph.set_input(inputspec, "rest_res_filt", "sub01/rest_bandpassed.nii.gz")?;
//!     graph.set_input(inputspec, "ref", "sub01/example_func.nii.gz")?;
//!
//!     let seeds = graph.find("seed_list_input").unwrap();
//!     graph.set_input(
//!         seeds,
//!         "seed_list",
//!         Value::paths(["seed_pcc.nii.gz", "seed_dmpfc.nii.gz"]),
//!     )?;
//!
//!     let fwhm = graph.find("fwhm_input").unwrap();
//!     graph.set_input(fwhm, "fwhm", Value::floats([4.5, 6.0]))?;
//!
//!     // Two seeds x two kernel widths = four smoothed output maps.
//!     let counts = fmriflow::graph::analysis::element_counts(&graph)?;
//!     assert_eq!(counts["smooth_mni.out_file"], 4);
//!
//!     Ok(())
//! }
//! ```
//!
//! [`create_seg_preproc`]: pipelines::create_seg_preproc
//! [`create_sca`]: pipelines::create_sca
//! [`Graph`]: graph::Graph
//! [`analysis`]: graph::analysis

pub mod error;
pub mod graph;
pub mod interface;
pub mod model_config;
pub mod pipelines;
pub mod prelude;
