// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# Event Power Grid

This is a library for representing the temporary power grid of an event site:
the power distribution units (PDUs) placed on a map, and the cables laid
between them.

The grid is kept as a directed forest, with power flowing from source PDUs
through cables into the PDUs they feed, and on through their output cables.

## Loading a grid

The main struct is [`NetworkGraph`], instances of which can be created by
passing a [`Snapshot`] of the grid's elements to the
[`try_new`][NetworkGraph::try_new] method.  Snapshots can be decoded from
JSON with [`Snapshot::from_json`].

Links between elements are stored on both ends: a cable names the PDU it is
fed from and the PDU it feeds, and a PDU names its input cable and its output
cables.  The graph keeps both ends in step through every edit, and
[`check_integrity`][NetworkGraph::check_integrity] reports any asymmetric or
dangling links and cycles.

## Editing

The graph can be edited with:

- [`move_pdu`][NetworkGraph::move_pdu]
- [`change_cable_path`][NetworkGraph::change_cable_path]
- [`connect_cable_to_pdu`][NetworkGraph::connect_cable_to_pdu]
- [`disconnect_cable_from_pdu`][NetworkGraph::disconnect_cable_from_pdu]
- [`delete_feature`][NetworkGraph::delete_feature]

Connecting an element also connects every loose element whose end lies on it,
transitively.  Every edit is recorded, and the changes can be read with
[`changes`][NetworkGraph::changes] or drained with
[`take_changes`][NetworkGraph::take_changes].

## Derived data

Derived data is cached per element in [`GridProperties`] bags and invalidated
downstream of every edit:

- the validation log of the element, see
  [`validate_element`][NetworkGraph::validate_element].
- the path to source, see
  [`path_to_source`][NetworkGraph::path_to_source].
- the voltage and current loss, see [`element_loss`][NetworkGraph::element_loss]
  and [`loss_to_source`][NetworkGraph::loss_to_source].

Grid totals are available from [`statistics`][NetworkGraph::statistics].
*/

mod cache;
pub use cache::{CachedLayer, CachedProperties, FeatureCache, Layer, LayerId, LayerRegistry};

mod config;
pub use config::GridConfig;

mod element;
pub use element::{Cable, Element, ElementId, Pdu, Point};

mod graph;
pub use graph::{iterators, GridProperties, GridStatistics, NetworkGraph};

mod graph_traits;
pub use graph_traits::{DependencyNotifier, Geodesic, Haversine};

mod log;
pub use log::{summarize, LogEntry, Severity};

mod loss;
pub use loss::{
    cable_current, cable_loss, flow_split, path_loss, CableLoss, ElementLoss, LoadModel,
    LossStrategy, PathLoss, PathStep, PduLoss, SegmentLoss, REFERENCE_VOLTAGE_LL,
    REFERENCE_VOLTAGE_LN,
};

mod size_catalog;
pub use size_catalog::{Phases, PowerSize, SizeInfo};

mod snapshot;
pub use snapshot::{ChangeSet, Snapshot};

mod error;
pub use error::Error;
