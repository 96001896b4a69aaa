use std::collections::HashMap;

use lif_network::connectivity::Connectivity;
use lif_network::network::Network;
use lif_network::neuron::{Neuron, Polarity};
use lif_network::spike_log::{read_spike_log, SpikeRecord, SpikeWriter};
use lif_network::{DELAY_STEPS, REFRACTORY_STEPS, STEP_SIZE};

/// Two neurons, the first one driven by a constant bias and projecting to the second one.
fn two_neurons(source: Polarity) -> Network {
    let mut neuron_0 = Neuron::new(source);
    neuron_0.set_bias(1.01);
    let neuron_1 = Neuron::new(Polarity::Inhibitory);
    let connectivity = Connectivity::from_targets(vec![vec![1], vec![]]).unwrap();
    Network::new_from(vec![neuron_0, neuron_1], connectivity, 5.0, 0).unwrap()
}

/// Check that the spike of the first neuron reaches the second one exactly after the delay,
/// and returns the potential of the second neuron right after delivery.
fn transmit(network: &mut Network) -> f64 {
    let mut spikes: Vec<SpikeRecord> = vec![];

    for _ in 0..924 {
        assert!(network.step(0, &mut spikes).unwrap().is_empty());
    }
    assert_eq!(network.neuron_ref(1).unwrap().potential(), 0.0);

    assert_eq!(network.step(0, &mut spikes).unwrap(), vec![0]);
    assert_eq!(spikes, vec![SpikeRecord::new(924, 0)]);

    for _ in 0..DELAY_STEPS - 1 {
        assert!(network.step(0, &mut spikes).unwrap().is_empty());
        assert_eq!(network.neuron_ref(1).unwrap().potential(), 0.0);
    }

    // Delivered at step 924 + DELAY_STEPS
    assert!(network.step(0, &mut spikes).unwrap().is_empty());
    assert_eq!(network.clock(), 940);
    assert!((network.clock() as f64 * STEP_SIZE - 94.0).abs() < 1e-3);
    assert_eq!(spikes.len(), 1);

    network.neuron_ref(1).unwrap().potential()
}

#[test]
fn test_spike_transmission_from_excitatory() {
    let mut network = two_neurons(Polarity::Excitatory);
    let potential = transmit(&mut network);
    assert!((potential - 0.1).abs() < 1e-12);
}

#[test]
fn test_spike_transmission_from_inhibitory() {
    let mut network = two_neurons(Polarity::Inhibitory);
    let potential = transmit(&mut network);
    assert!((potential + 0.5).abs() < 1e-12);
}

#[test]
fn test_isolated_neuron_spike_times() {
    let mut neuron = Neuron::new(Polarity::Excitatory);
    neuron.set_bias(1.01);
    let mut network =
        Network::new_from(vec![neuron], Connectivity::new_empty(1), 5.0, 0).unwrap();

    let mut spikes: Vec<SpikeRecord> = vec![];
    network.run(0, 3757, &mut spikes).unwrap();

    let steps: Vec<u64> = spikes.iter().map(|spike| spike.step).collect();
    assert_eq!(steps, vec![924, 1868, 2812, 3756]);
}

#[test]
fn test_network_creation() {
    let mut network = Network::build(true, 3.0, 2.0, 12500, 42).unwrap();
    network.create_network().unwrap();

    assert_eq!(network.num_neurons(), 12500);
    assert_eq!(network.num_excitatory(), 10000);
    assert_eq!(network.num_inhibitory(), 2500);
    assert_eq!(network.num_exc_inputs(), 1000);
    assert_eq!(network.num_inh_inputs(), 250);
    assert!((network.external_rate() - 20.0).abs() < 1e-12);
    assert!((network.external_rate() * STEP_SIZE - 2.0).abs() < 1e-12);

    let connectivity = network.connectivity();
    assert_eq!(connectivity.num_connections(), 12500 * 1250);
    assert!(connectivity.in_degrees().iter().all(|&k| k == 1250));
    assert!(connectivity
        .in_degrees_from(0..10000)
        .iter()
        .all(|&k| k == 1000));
    assert!(connectivity
        .in_degrees_from(10000..12500)
        .iter()
        .all(|&k| k == 250));
}

#[test]
fn test_network_recreation() {
    let mut network = Network::build(true, 5.0, 2.0, 200, 42).unwrap();
    network.create_network().unwrap();
    let first = network.connectivity().clone();

    let mut spikes: Vec<SpikeRecord> = vec![];
    network.run(0, 2000, &mut spikes).unwrap();
    assert!(!spikes.is_empty());

    network.create_network().unwrap();
    assert_eq!(network.clock(), 0);
    assert_eq!(network.cursor().read(), 0);
    assert_eq!(network.cursor().write(), DELAY_STEPS);
    assert_eq!(network.neurons().len(), 200);
    assert_ne!(network.connectivity(), &first);
    assert!(network.connectivity().in_degrees().iter().all(|&k| k == 16 + 4));
    for neuron in network.neurons() {
        assert_eq!(neuron.potential(), 0.0);
        assert_eq!(neuron.last_spike(), None);
        assert!(neuron.buffer().slots().iter().all(|&s| s == 0.0));
    }
}

#[test]
fn test_refractory_period_in_network() {
    let mut network = Network::build(true, 3.0, 2.0, 200, 7).unwrap();
    network.create_network().unwrap();

    let mut spikes: Vec<SpikeRecord> = vec![];
    network.run(0, 3000, &mut spikes).unwrap();
    assert!(!spikes.is_empty());

    let mut last_spikes: HashMap<usize, u64> = HashMap::new();
    for spike in spikes.iter() {
        if let Some(last) = last_spikes.insert(spike.neuron_id, spike.step) {
            assert!(spike.step - last >= REFRACTORY_STEPS);
        }
    }
}

#[test]
fn test_log_order() {
    let mut network = Network::build(true, 5.0, 2.0, 500, 11).unwrap();
    network.create_network().unwrap();

    let mut spikes: Vec<SpikeRecord> = vec![];
    network.run(500, 3000, &mut spikes).unwrap();
    assert!(!spikes.is_empty());

    assert!(spikes.iter().all(|spike| spike.step > 500 && spike.step < 3000));
    assert!(spikes.iter().all(|spike| spike.neuron_id < 500));
    for pair in spikes.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(a.step < b.step || (a.step == b.step && a.neuron_id < b.neuron_id));
    }
}

#[test]
fn test_same_seed_same_spikes() {
    let run = |seed: u64| {
        let mut network = Network::build(true, 5.0, 2.0, 300, seed).unwrap();
        network.create_network().unwrap();
        let mut spikes: Vec<SpikeRecord> = vec![];
        network.run(0, 2000, &mut spikes).unwrap();
        spikes
    };

    let spikes = run(3);
    assert!(!spikes.is_empty());
    assert_eq!(spikes, run(3));
    assert_ne!(spikes, run(4));
}

#[test]
fn test_parallel_matches_sequential() {
    let run = |parallel: bool| {
        let mut network = Network::build(true, 5.0, 2.0, 1000, 5).unwrap();
        network.create_network().unwrap();
        network.set_parallel(parallel);
        let mut spikes: Vec<SpikeRecord> = vec![];
        network.run(0, 1500, &mut spikes).unwrap();
        (spikes, network.neurons().to_vec())
    };

    let (spikes_par, neurons_par) = run(true);
    let (spikes_seq, neurons_seq) = run(false);
    assert!(!spikes_par.is_empty());
    assert_eq!(spikes_par, spikes_seq);
    assert_eq!(neurons_par, neurons_seq);
}

#[test]
fn test_spike_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spikes.txt");

    let mut network = Network::build(true, 5.0, 2.0, 100, 9).unwrap();
    network.create_network().unwrap();
    let mut writer = SpikeWriter::create(&path).unwrap();
    network.run(100, 1500, &mut writer).unwrap();
    writer.flush().unwrap();
    let num_spikes = writer.num_spikes();

    let mut network = Network::build(true, 5.0, 2.0, 100, 9).unwrap();
    network.create_network().unwrap();
    let mut spikes: Vec<SpikeRecord> = vec![];
    network.run(100, 1500, &mut spikes).unwrap();

    assert_eq!(num_spikes, spikes.len());
    assert_eq!(read_spike_log(&path).unwrap(), spikes);
}

#[test]
fn test_saved_topology_reproduces_network() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("topology.json");

    let mut network = Network::build(false, 5.0, 2.0, 100, 1).unwrap();
    network.create_network().unwrap();
    network.connectivity().save_to(&path).unwrap();

    let mut other = Network::build(false, 5.0, 2.0, 100, 2).unwrap();
    other
        .create_network_with(Connectivity::load_from(&path).unwrap())
        .unwrap();
    assert_eq!(network.connectivity(), other.connectivity());
}
