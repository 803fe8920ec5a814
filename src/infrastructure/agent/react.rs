//! Reason-and-act loop over an LLM provider and a set of tools

use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::domain::{LlmProvider, LlmRequest, Tool};
use crate::infrastructure::observability::record_tool_call;

pub const DEFAULT_MAX_ITERATIONS: usize = 5;

pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit.";

const STOP_SEQUENCE: &str = "\nObservation:";

const FINAL_ANSWER: &str = "Final Answer:";

const PROMPT_TEMPLATE: &str = r#"You are a helpful assistant that answers questions about movies in the IMDB database.

You have access to the following tools:

{tools}

IMPORTANT: Use this EXACT format for every step:

Question: the input question you must answer
Thought: think about what to do next
Action: the action to take, must be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

EXAMPLE:
Question: What are the top 3 movies by Christopher Nolan?
Thought: I should look up movies directed by Christopher Nolan.
Action: get_movies_by_director
Action Input: Christopher Nolan
Observation: [list of movies]
Thought: I now know the final answer
Final Answer: The top 3 Christopher Nolan movies are ...

Begin!

Question: {input}
Thought:"#;

static ACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("valid action regex")
});

static ACTION_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)").expect("valid action regex"));

/// One parsed model completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    Action { tool: String, input: String },
    Finish(String),
    /// Unparseable output; the message is fed back as the observation
    Invalid(String),
}

impl AgentStep {
    pub fn parse(text: &str) -> Self {
        let has_final = text.contains(FINAL_ANSWER);

        if let Some(captures) = ACTION_RE.captures(text) {
            if has_final {
                return Self::Invalid(
                    "Parsing LLM output produced both a final answer and a parse-able action"
                        .to_string(),
                );
            }

            let tool = captures[1].trim().to_string();
            let input = captures[2]
                .split(STOP_SEQUENCE)
                .next()
                .unwrap_or_default()
                .trim()
                .trim_matches('"')
                .to_string();

            return Self::Action { tool, input };
        }

        if let Some((_, answer)) = text.split_once(FINAL_ANSWER) {
            return Self::Finish(answer.trim().to_string());
        }

        if !ACTION_ONLY_RE.is_match(text) {
            Self::Invalid("Invalid Format: Missing 'Action:' after 'Thought:'".to_string())
        } else {
            Self::Invalid("Invalid Format: Missing 'Action Input:' after 'Action:'".to_string())
        }
    }
}

/// Answers free-form questions by letting the model call tools
///
/// Each iteration sends the prompt plus the transcript so far and stops the
/// model before it writes its own observation. The loop ends on a final
/// answer or after `max_iterations` completions.
#[derive(Debug)]
pub struct ReactAgent {
    provider: Arc<dyn LlmProvider>,
    tools: Vec<Arc<dyn Tool>>,
    max_iterations: usize,
    temperature: f32,
}

impl ReactAgent {
    pub fn new(provider: Arc<dyn LlmProvider>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            provider,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            temperature: 0.0,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    fn build_prompt(&self, question: &str) -> String {
        let tools = self
            .tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n");

        PROMPT_TEMPLATE
            .replace("{tools}", &tools)
            .replace("{tool_names}", &self.tool_names().join(", "))
            .replace("{input}", question)
    }

    async fn observe(&self, tool: &str, input: &str) -> String {
        match self.tools.iter().find(|t| t.name() == tool) {
            Some(t) => {
                record_tool_call(t.name());
                t.call(input).await
            }
            None => format!(
                "{} is not a valid tool, try one of [{}].",
                tool,
                self.tool_names().join(", ")
            ),
        }
    }

    /// Runs the loop for one question; never fails
    pub async fn query(&self, question: &str) -> String {
        let started = Instant::now();
        let prompt = self.build_prompt(question);
        let mut scratchpad = String::new();

        for iteration in 1..=self.max_iterations {
            let request = LlmRequest::builder()
                .user(format!("{}{}", prompt, scratchpad))
                .temperature(self.temperature)
                .stop(vec![STOP_SEQUENCE.to_string()])
                .build();

            let response = match self.provider.chat(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, iteration, "Agent model call failed");
                    return format!("Error processing query: {}", e);
                }
            };

            let text = response.content();
            let observation = match AgentStep::parse(text) {
                AgentStep::Finish(answer) => {
                    info!(
                        iterations = iteration,
                        duration_ms = started.elapsed().as_millis() as u64,
                        "Agent finished"
                    );
                    return answer;
                }
                AgentStep::Action { tool, input } => {
                    debug!(iteration, tool = %tool, input = %input, "Agent action");
                    self.observe(&tool, &input).await
                }
                AgentStep::Invalid(message) => {
                    debug!(iteration, output = %text, "Unparseable agent output");
                    message
                }
            };

            scratchpad.push_str(text.trim_end());
            scratchpad.push_str("\nObservation: ");
            scratchpad.push_str(&observation);
            scratchpad.push_str("\nThought:");
        }

        warn!(max_iterations = self.max_iterations, "Agent hit iteration limit");
        ITERATION_LIMIT_MESSAGE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct EchoTool {
        inputs: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Repeats its input"
        }

        async fn call(&self, input: &str) -> String {
            self.inputs.lock().unwrap().push(input.to_string());
            format!("echo: {}", input)
        }
    }

    fn agent(provider: MockLlmProvider) -> (ReactAgent, Arc<MockLlmProvider>, Arc<EchoTool>) {
        let provider = Arc::new(provider);
        let tool = Arc::new(EchoTool::default());
        let agent = ReactAgent::new(provider.clone(), vec![tool.clone() as Arc<dyn Tool>]);
        (agent, provider, tool)
    }

    #[test]
    fn test_parse_action() {
        let step = AgentStep::parse(" I should search.\nAction: echo\nAction Input: \"Heat\"");
        assert_eq!(
            step,
            AgentStep::Action {
                tool: "echo".to_string(),
                input: "Heat".to_string()
            }
        );
    }

    #[test]
    fn test_parse_action_drops_hallucinated_observation() {
        let step = AgentStep::parse("Action: echo\nAction Input: Heat\nObservation: made up");
        assert_eq!(
            step,
            AgentStep::Action {
                tool: "echo".to_string(),
                input: "Heat".to_string()
            }
        );
    }

    #[test]
    fn test_parse_final_answer() {
        let step = AgentStep::parse(" I now know the final answer\nFinal Answer: Heat (1995)\n");
        assert_eq!(step, AgentStep::Finish("Heat (1995)".to_string()));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            AgentStep::parse("I am not sure"),
            AgentStep::Invalid(m) if m.contains("Missing 'Action:'")
        ));
        assert!(matches!(
            AgentStep::parse("Action: echo"),
            AgentStep::Invalid(m) if m.contains("Missing 'Action Input:'")
        ));
        assert!(matches!(
            AgentStep::parse("Action: echo\nAction Input: x\nFinal Answer: y"),
            AgentStep::Invalid(m) if m.contains("both a final answer")
        ));
    }

    #[test]
    fn test_prompt_lists_tools() {
        let (agent, _, _) = agent(MockLlmProvider::new("mock"));
        let prompt = agent.build_prompt("Who directed Heat?");

        assert!(prompt.contains("echo: Repeats its input"));
        assert!(prompt.contains("must be one of [echo]"));
        assert!(prompt.ends_with("Question: Who directed Heat?\nThought:"));
    }

    #[tokio::test]
    async fn test_direct_final_answer() {
        let (agent, provider, tool) =
            agent(MockLlmProvider::new("mock").with_reply(" Easy.\nFinal Answer: Michael Mann"));

        assert_eq!(agent.query("Who directed Heat?").await, "Michael Mann");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].stop, Some(vec!["\nObservation:".to_string()]));
        assert_eq!(requests[0].temperature, Some(0.0));
        assert!(tool.inputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_action_then_answer() {
        let (agent, provider, tool) = agent(
            MockLlmProvider::new("mock")
                .with_reply(" Look it up.\nAction: echo\nAction Input: Heat")
                .with_reply(" I now know the final answer\nFinal Answer: Found it"),
        );

        assert_eq!(agent.query("Find Heat").await, "Found it");
        assert_eq!(*tool.inputs.lock().unwrap(), vec!["Heat".to_string()]);

        let second = provider.requests()[1].messages[0].content.clone();
        assert!(second.contains("Action Input: Heat\nObservation: echo: Heat\nThought:"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_observation() {
        let (agent, provider, _) = agent(
            MockLlmProvider::new("mock")
                .with_reply("Action: imdb_lookup\nAction Input: Heat")
                .with_reply("Final Answer: done"),
        );

        assert_eq!(agent.query("Find Heat").await, "done");

        let second = provider.requests()[1].messages[0].content.clone();
        assert!(second.contains("imdb_lookup is not a valid tool, try one of [echo]."));
    }

    #[tokio::test]
    async fn test_invalid_output_is_fed_back() {
        let (agent, provider, _) = agent(
            MockLlmProvider::new("mock")
                .with_reply("Hmm, let me think")
                .with_reply("Final Answer: ok"),
        );

        assert_eq!(agent.query("?").await, "ok");

        let second = provider.requests()[1].messages[0].content.clone();
        assert!(second.contains("Observation: Invalid Format"));
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let mut provider = MockLlmProvider::new("mock");
        for _ in 0..5 {
            provider = provider.with_reply("Action: echo\nAction Input: again");
        }
        let (agent, provider, tool) = agent(provider);
        let agent = agent.with_max_iterations(3);

        assert_eq!(agent.query("loop").await, ITERATION_LIMIT_MESSAGE);
        assert_eq!(provider.requests().len(), 3);
        assert_eq!(tool.inputs.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_provider_error_is_answer_text() {
        let (agent, _, _) = agent(MockLlmProvider::new("mock").with_error("connection refused"));

        assert_eq!(
            agent.query("anything").await,
            "Error processing query: Provider error: mock - connection refused"
        );
    }
}
