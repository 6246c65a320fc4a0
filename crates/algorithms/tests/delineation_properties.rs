//! End-to-end delineation on synthetic networks

use hydrodiv_algorithms::delineation::{
    delineate, extract_watershed, outlet_records, subdivide, summarize, upstream_updown,
    ConnectivityParams, DelineationParams, GagedFlowlines, Linkage, OutletKind, OutletSources,
    SubbasinClass, SubdivideParams, Watershed,
};
use hydrodiv_algorithms::geometry::FlowlineIndex;
use hydrodiv_core::{Comid, DamRecord, FlowlineNode, FlowlineShape, GageRecord, Network};
use std::collections::HashSet;

// ─── Fixtures ───────────────────────────────────────────────────────────

fn node(comid: u64, seq: u64, up: Option<u64>, down: Option<u64>, inc: f64, cum: f64) -> FlowlineNode {
    let mut n = FlowlineNode::new(comid, seq, up, down, cum);
    n.incremental_area = inc;
    n
}

///   101 ─┐
///        ├─ 103 ─┐
///   102 ─┘       ├─ 105 ─┐
///          104 ──┘       ├─ 107
///   (900) → 106 ─────────┘
fn basin() -> Network {
    Network::from_records(vec![
        node(101, 1, None, Some(3), 10.0, 10.0),
        node(102, 2, None, Some(3), 8.0, 8.0),
        node(103, 3, Some(1), Some(5), 2.0, 20.0),
        node(104, 4, None, Some(5), 15.0, 15.0),
        node(105, 5, Some(3), Some(7), 5.0, 40.0),
        node(106, 6, Some(900), Some(7), 5.0, 30.0),
        node(107, 7, Some(5), None, 5.0, 75.0),
    ])
    .unwrap()
}

/// Flowline k runs diagonally over [k, k + 0.5]² so bounding boxes never overlap
fn basin_shapes() -> FlowlineIndex {
    FlowlineIndex::new(
        (101..=107)
            .map(|c| {
                let x = (c - 100) as f64;
                FlowlineShape::new(c, vec![(x, x), (x + 0.5, x + 0.5)])
            })
            .collect(),
    )
}

fn on_flowline(comid: u64) -> (f64, f64) {
    let x = (comid - 100) as f64 + 0.25;
    (x, x)
}

/// Complete binary tree: flowline i drains to i / 2, areas vary per node
fn binary_tree(depth: u32) -> Network {
    let n = (1u64 << depth) - 1;
    let inc = |i: u64| 1.0 + ((i * 7) % 5) as f64;
    let mut cum = vec![0.0; n as usize + 2];
    for i in (1..=n).rev() {
        let children: f64 = [2 * i, 2 * i + 1].iter().filter(|&&c| c <= n).map(|&c| cum[c as usize]).sum();
        cum[i as usize] = inc(i) + children;
    }
    Network::from_records((1..=n).map(|i| {
        let up = (2 * i <= n).then(|| {
            if cum[(2 * i + 1) as usize] > cum[(2 * i) as usize] {
                2 * i + 1
            } else {
                2 * i
            }
        });
        let down = (i > 1).then_some(i / 2);
        node(1000 + i, i, up, down, inc(i), cum[i as usize])
    }))
    .unwrap()
}

fn run(network: &Network, drainmax: Option<f64>) -> Watershed {
    let params = DelineationParams {
        subdivide: SubdivideParams { drainmax },
        ..Default::default()
    };
    delineate(network, &OutletSources::default(), &params).unwrap()
}

fn sorted(mut v: Vec<Comid>) -> Vec<Comid> {
    v.sort();
    v
}

fn comids(ids: &[u64]) -> Vec<Comid> {
    ids.iter().map(|&c| Comid(c)).collect()
}

// ─── Invariants ─────────────────────────────────────────────────────────

fn assert_partition(network: &Network, ws: &Watershed) {
    let mut seen = HashSet::new();
    for subbasin in &ws.subbasins {
        for &member in &subbasin.members {
            assert!(seen.insert(member), "{member} belongs to two subbasins");
        }
    }
    let all: HashSet<Comid> = network.iter().map(|n| n.comid).collect();
    assert_eq!(seen, all);
}

fn assert_single_exit(ws: &Watershed) {
    assert_eq!(ws.exits().len(), 1);
    let exit = ws.exits()[0];
    let linkage = ws.linkage();
    for subbasin in &ws.subbasins {
        let mut current = subbasin.outlet;
        let mut hops = 0;
        while let Linkage::Downstream(next) = linkage[&current] {
            current = next;
            hops += 1;
            assert!(hops <= ws.len(), "linkage cycle through {}", subbasin.outlet);
        }
        assert_eq!(current, exit);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────

#[test]
fn test_basin_outlets_and_classes() {
    let net = basin();
    let ws = run(&net, Some(25.0));

    assert_eq!(sorted(ws.outlets.as_slice().to_vec()), comids(&[103, 104, 105, 106, 107]));
    assert_eq!(ws.outlets.kind(Comid(107)), Some(&OutletKind::Terminal));
    assert_eq!(ws.outlets.kind(Comid(105)), Some(&OutletKind::MajorTributary));
    assert_eq!(ws.outlets.kind(Comid(103)), Some(&OutletKind::DrainageArea));

    assert_eq!(sorted(ws.subbasin(Comid(103)).unwrap().members.clone()), comids(&[101, 102, 103]));
    assert_eq!(ws.subbasin(Comid(103)).unwrap().downstream, Linkage::Downstream(Comid(105)));
    assert_eq!(ws.subbasin(Comid(106)).unwrap().class, SubbasinClass::Inlet);
    assert_eq!(ws.subbasin(Comid(103)).unwrap().class, SubbasinClass::Headwater);
    assert_eq!(ws.subbasin(Comid(107)).unwrap().class, SubbasinClass::Interior);
    assert_eq!(sorted(ws.headwaters()), comids(&[103, 104]));
    assert_eq!(ws.inlets(), comids(&[106]));

    assert_partition(&net, &ws);
    assert_single_exit(&ws);
}

#[test]
fn test_partition_and_linkage_on_trees() {
    for depth in 1..=7 {
        let net = binary_tree(depth);
        let total = net.terminal().cumulative_area;
        for drainmax in [None, Some(total / 2.0), Some(total / 8.0), Some(3.0), Some(0.5)] {
            let ws = run(&net, drainmax);
            assert_partition(&net, &ws);
            assert_single_exit(&ws);
        }
    }
}

#[test]
fn test_subdivision_is_idempotent() {
    let net = binary_tree(6);
    let first = run(&net, Some(12.0));
    let second = run(&net, Some(12.0));
    assert_eq!(first.outlets, second.outlets);

    // the final outlet set is a fixed point
    let mut again = first.outlets.clone();
    let passes = subdivide(&net, &mut again, &SubdivideParams { drainmax: Some(12.0) }).unwrap();
    assert_eq!(passes, 1);
    assert_eq!(again, first.outlets);
}

#[test]
fn test_chain_outlets_below_area_jumps() {
    let net = Network::from_records(vec![
        FlowlineNode::new(105, 5, Some(4), None, 100.0),
        FlowlineNode::new(104, 4, Some(3), Some(5), 100.0),
        FlowlineNode::new(103, 3, Some(2), Some(4), 30.0),
        FlowlineNode::new(102, 2, Some(1), Some(3), 20.0),
        FlowlineNode::new(101, 1, None, Some(2), 10.0),
    ])
    .unwrap();
    let ws = run(&net, Some(25.0));
    assert_eq!(sorted(ws.outlets.as_slice().to_vec()), comids(&[103, 104, 105]));
    assert_eq!(ws.outlets.kind(Comid(103)), Some(&OutletKind::DrainageArea));
    assert_eq!(ws.outlets.kind(Comid(104)), Some(&OutletKind::DrainageArea));
}

#[test]
fn test_dam_outlet_and_junction_forcing() {
    let net = basin();
    let (x, y) = on_flowline(101);
    let sources = OutletSources {
        flowlines: basin_shapes(),
        dams: vec![DamRecord::new("NC00123", x, y)],
        ..Default::default()
    };

    let ws = delineate(&net, &sources, &DelineationParams::default()).unwrap();
    // the dam reaches the main channel, so only its sibling is bounded
    assert_eq!(sorted(ws.outlets.as_slice().to_vec()), comids(&[101, 102, 107]));
    assert_eq!(
        ws.outlets.kind(Comid(101)),
        Some(&OutletKind::Dam { nid: "NC00123".into() })
    );
    assert_eq!(ws.outlets.kind(Comid(102)), Some(&OutletKind::MajorTributary));

    let forced = DelineationParams {
        connectivity: ConnectivityParams { force_junction_outlets: true },
        ..Default::default()
    };
    let ws = delineate(&net, &sources, &forced).unwrap();
    assert_eq!(ws.outlets.kind(Comid(105)), Some(&OutletKind::Connectivity));
    assert_eq!(ws.outlets.kind(Comid(106)), Some(&OutletKind::Connectivity));
    assert_partition(&net, &ws);
    assert_single_exit(&ws);
}

#[test]
fn test_outlet_records_carry_gage_flow() {
    let net = basin();
    let (x, y) = on_flowline(105);
    let mut gage = GageRecord::new("03451500", x, y);
    gage.average_flow = Some(120.0);
    gage.web = Some("https://waterdata.usgs.gov/nwis/uv?site_no=03451500".into());
    let sources = OutletSources {
        flowlines: basin_shapes(),
        gages: vec![gage],
        ..Default::default()
    };

    let ws = delineate(&net, &sources, &DelineationParams::default()).unwrap();
    assert_eq!(
        ws.outlets.kind(Comid(105)),
        Some(&OutletKind::Gage { site_no: "03451500".into() })
    );

    let gaged = GagedFlowlines::match_gages(&net, &sources);
    let records = outlet_records(&net, &ws.outlets, &sources, &gaged).unwrap();
    let record = records.iter().find(|r| r.comid == Comid(105)).unwrap();
    assert_eq!(record.site_no.as_deref(), Some("03451500"));
    assert!(record.web.is_some());
    assert_eq!(record.average_flow, 120.0);
    assert_eq!(record.drainage_area_km2, 40.0);
}

#[test]
fn test_extract_gage_watershed() {
    let net = basin();
    let updown = upstream_updown(&net, Comid(105)).unwrap();
    assert_eq!(updown.len(), 5);
    assert_eq!(updown[&Comid(105)], None);
    assert_eq!(updown[&Comid(101)], Some(Comid(103)));

    let sub = extract_watershed(&net, Comid(105)).unwrap();
    assert_eq!(sub.len(), 5);
    assert_eq!(sub.terminal().comid, Comid(105));
    assert!(!sub.contains(Comid(106)));
}

#[test]
fn test_summaries_cover_local_area() {
    let net = basin();
    let ws = run(&net, Some(25.0));
    let summaries = summarize(&net, &ws, &[]).unwrap();
    assert_eq!(summaries.len(), ws.len());

    let local: f64 = summaries.iter().map(|s| s.local_area_km2).sum();
    let total: f64 = net.iter().map(|n| n.incremental_area).sum();
    assert!((local - total).abs() < 1e-9);
    assert!(summaries.iter().all(|s| s.flow_plane.is_none()));

    let upper = summaries.iter().find(|s| s.outlet == Comid(103)).unwrap();
    assert_eq!(upper.reach.path, comids(&[101, 103]));
    assert_eq!(upper.flowlines, 3);
}
