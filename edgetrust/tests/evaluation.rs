use edgetrust::{
	load, storage::ScoreRecord, EdgeRecord, EvaluationConfig, Evaluator, Method, Predictor,
	SignedGraph,
};

fn toy_graph() -> SignedGraph {
	load(vec![
		EdgeRecord::new("A", "B", 3.0),
		EdgeRecord::new("B", "A", 3.0),
		EdgeRecord::new("A", "C", -2.0),
		EdgeRecord::new("C", "B", 1.0),
	])
	.unwrap()
}

fn community_graph() -> SignedGraph {
	let mut records = Vec::new();
	for group in ["x", "y"] {
		for i in 0..5 {
			for j in 0..5 {
				if i != j {
					records.push(EdgeRecord::new(
						format!("{}{}", group, i),
						format!("{}{}", group, j),
						4.0,
					));
				}
			}
		}
	}
	for i in 0..5 {
		records.push(EdgeRecord::new(format!("x{}", i), format!("y{}", i), -3.0));
		records.push(EdgeRecord::new(format!("y{}", (i + 1) % 5), format!("x{}", i), -3.0));
	}
	load(records).unwrap()
}

#[test]
fn leave_one_out_restores_toy_graph() {
	let graph = toy_graph();
	let evaluator = Evaluator::new(EvaluationConfig::new(2024)).unwrap();

	let report = evaluator.evaluate_leave_one(&graph, 1000).unwrap();

	assert_eq!(report.sample_size, 4);
	assert_eq!(graph.edge_count(), 4);
	assert_eq!(graph.weight("A", "B"), Some(3.0));
	assert_eq!(graph.weight("B", "A"), Some(3.0));
	assert_eq!(graph.weight("A", "C"), Some(-2.0));
	assert_eq!(graph.weight("C", "B"), Some(1.0));

	for method in Method::ALL {
		let outcome = report.get(method).unwrap();
		assert_eq!(outcome.predictions.len() + outcome.missing(), 4);
	}

	let reciprocal = report.get(Method::Reciprocal).unwrap();
	let a_to_b = reciprocal
		.predictions
		.iter()
		.find(|record| record.source == "A" && record.target == "B")
		.unwrap();
	assert_eq!(a_to_b.predicted_weight, 3.0);
}

#[test]
fn leave_percent_separates_communities() {
	let graph = community_graph();
	let evaluator = Evaluator::new(EvaluationConfig::new(9)).unwrap();

	let result = evaluator.evaluate_leave_percent(&graph, &[0, 10, 20]).unwrap();

	for method in Method::ALL {
		let rounds = result.get(method).unwrap();
		assert_eq!(rounds.len(), 3);
		assert_eq!(rounds[0].held_out_edges, 0);
		assert_eq!(rounds[1].held_out_edges, 5);
		assert_eq!(rounds[2].held_out_edges, 10);
		for round in rounds {
			assert_eq!(round.retained_edges + round.held_out_edges, 50);
			if let Some(rmse) = round.metrics.rmse {
				assert!(rmse.is_finite() && rmse >= 0.0);
			}
			if let Some(pcc) = round.metrics.pcc {
				assert!((-1.0..=1.0).contains(&pcc));
			}
		}
	}
}

#[test]
fn scores_cover_every_node() {
	let graph = community_graph();
	let evaluator = Evaluator::new(EvaluationConfig::new(1)).unwrap();

	let models = evaluator.fit_models(&graph);

	assert_eq!(models.models.len(), 8);
	assert!(models.regression.is_some());
	for model in models.models.values() {
		assert_eq!(model.len(), graph.node_count());
	}

	let status = ScoreRecord::from_model(&models.models[&Method::StatusTheory]);
	assert_eq!(status.len(), 10);

	let balance = &models.models[&Method::TriadicBalance];
	assert!(balance.predict("x0", "x1").unwrap() > 0.0);
	assert!(balance.predict("x0", "y2").unwrap() < 0.0);
}
