//! TypeScript project skeleton rendered from a specification.
//!
//! Content is opaque text to the pipeline; these renderers only need to be
//! deterministic for a given specification.

use architect_common::{GeneratedFile, ProjectSpecification};

/// Name of the core module, derived from the description.
pub fn module_name(spec: &ProjectSpecification) -> &'static str {
    let lower = spec.description.to_lowercase();
    if lower.contains("search") {
        "searcher"
    } else if lower.contains("todo") {
        "todoManager"
    } else {
        "core"
    }
}

fn class_name(module: &str) -> String {
    let mut chars = module.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Plan the ordered file list: entry, core module, types, optional config,
/// tests.
pub fn plan_files(spec: &ProjectSpecification) -> Vec<GeneratedFile> {
    let module = module_name(spec);
    let mut files = vec![
        GeneratedFile::planned("src/index.ts", render_entry(spec, module)),
        GeneratedFile::planned(format!("src/core/{}.ts", module), render_core(spec, module)),
        GeneratedFile::planned("src/types/index.ts", render_types(spec)),
    ];
    if spec.has_feature("config") {
        files.push(GeneratedFile::planned("src/config.ts", render_config()));
    }
    files.push(GeneratedFile::planned(
        format!("tests/{}.test.ts", module),
        render_tests(module),
    ));
    files
}

fn render_entry(spec: &ProjectSpecification, module: &str) -> String {
    let class = class_name(module);
    let (config_import, config_load) = if spec.has_feature("config") {
        (
            "import { Config } from './config';\n",
            "const config = Config.load();",
        )
    } else {
        ("", "const config = { verbose: false, maxResults: 100 };")
    };

    format!(
        r#"/**
 * {description}
 *
 * Tech stack: {tech_stack}
 * UI type: {ui_type}
 *
 * Generated by Architect
 */

import {{ {class} }} from './core/{module}';
{config_import}
async function main(): Promise<void> {{
    console.log('Starting {description}...');

    {config_load}

    const app = new {class}({{
        verbose: config.verbose,
        maxResults: config.maxResults
    }});

    await app.initialize();
    console.log('Ready.');

    {ui_startup}
}}

main().catch(err => {{
    console.error('Startup failed:', err);
    process.exit(1);
}});
"#,
        description = spec.description,
        tech_stack = spec.tech_stack,
        ui_type = spec.ui_type,
        class = class,
        module = module,
        config_import = config_import,
        config_load = config_load,
        ui_startup = render_ui_startup(&spec.ui_type),
    )
}

fn render_ui_startup(ui_type: &str) -> &'static str {
    match ui_type {
        "cli" => {
            r#"// CLI mode
    const readline = require('readline');
    const rl = readline.createInterface({ input: process.stdin, output: process.stdout });
    rl.question('Command: ', async (input: string) => {
        const result = await app.execute(input);
        console.log(result);
        rl.close();
    });"#
        }
        "web" => {
            r#"// Web server mode
    const express = require('express');
    const server = express();
    server.use(express.json());
    server.post('/api/execute', async (req, res) => {
        const result = await app.execute(req.body.command);
        res.json(result);
    });
    server.listen(3000, () => console.log('Listening on http://localhost:3000'));"#
        }
        "api" => {
            r#"// Headless API mode
    const http = require('http');
    http.createServer(async (req, res) => {
        res.writeHead(200, { 'Content-Type': 'application/json' });
        res.end(JSON.stringify({ status: 'ready' }));
    }).listen(8080);"#
        }
        _ => {
            r#"// Default mode
    await app.run();"#
        }
    }
}

fn render_core(spec: &ProjectSpecification, module: &str) -> String {
    let class = class_name(module);
    format!(
        r#"/**
 * Core module: {class}
 *
 * Implements the main logic of: {description}
 */

import type {{ AppOptions, ExecuteResult }} from '../types';

export class {class} {{
    private options: AppOptions;
    private initialized: boolean = false;

    constructor(options: AppOptions) {{
        this.options = options;
    }}

    async initialize(): Promise<void> {{
        if (this.options.verbose) {{
            console.log('Initializing {class}...');
        }}
        await this.loadResources();
        await this.validateEnvironment();
        this.initialized = true;
    }}

    private async loadResources(): Promise<void> {{
        await this.delay(100);
    }}

    private async validateEnvironment(): Promise<void> {{
        await this.delay(50);
    }}

    async execute(input: string): Promise<ExecuteResult> {{
        if (!this.initialized) {{
            throw new Error('Module not initialized');
        }}

        const startTime = Date.now();
        const results = await this.processInput(input);

        return {{
            success: true,
            data: results,
            duration: Date.now() - startTime,
            count: results.length
        }};
    }}

    async run(): Promise<void> {{
        await this.execute('');
    }}

    private async processInput(input: string): Promise<string[]> {{
        const results: string[] = [];
        for (const item of input.split(' ').filter(Boolean)) {{
            if (this.matchesCriteria(item)) {{
                results.push(item);
            }}
            if (results.length >= this.options.maxResults) {{
                break;
            }}
        }}
        return results;
    }}

    private matchesCriteria(item: string): boolean {{
        return item.length > 0;
    }}

    private delay(ms: number): Promise<void> {{
        return new Promise(resolve => setTimeout(resolve, ms));
    }}
}}
"#,
        class = class,
        description = spec.description,
    )
}

fn render_types(spec: &ProjectSpecification) -> String {
    format!(
        r#"/**
 * Type definitions
 *
 * Project: {description}
 */

export interface AppOptions {{
    verbose: boolean;
    maxResults: number;
}}

export interface ExecuteResult {{
    success: boolean;
    data: string[];
    duration: number;
    count: number;
}}

export interface ConfigOptions {{
    verbose: boolean;
    maxResults: number;
    outputFormat: 'json' | 'text' | 'table';
    logLevel: 'debug' | 'info' | 'warn' | 'error';
}}
"#,
        description = spec.description,
    )
}

fn render_config() -> String {
    r#"/**
 * Configuration management
 */

import type { ConfigOptions } from './types';
import * as fs from 'fs';
import * as path from 'path';

const CONFIG_FILE = 'config.json';
const DEFAULT_CONFIG: ConfigOptions = {
    verbose: false,
    maxResults: 100,
    outputFormat: 'text',
    logLevel: 'info'
};

export class Config {
    private static instance: ConfigOptions | null = null;

    static load(): ConfigOptions {
        if (this.instance) {
            return this.instance;
        }

        const configPath = path.resolve(process.cwd(), CONFIG_FILE);
        if (fs.existsSync(configPath)) {
            try {
                const raw = fs.readFileSync(configPath, 'utf-8');
                this.instance = { ...DEFAULT_CONFIG, ...JSON.parse(raw) };
            } catch {
                console.warn('Could not parse config.json, using defaults');
                this.instance = DEFAULT_CONFIG;
            }
        } else {
            this.instance = DEFAULT_CONFIG;
        }
        return this.instance;
    }

    static save(config: Partial<ConfigOptions>): void {
        const merged = { ...this.load(), ...config };
        const configPath = path.resolve(process.cwd(), CONFIG_FILE);
        fs.writeFileSync(configPath, JSON.stringify(merged, null, 2));
        this.instance = merged;
    }
}
"#
    .to_string()
}

fn render_tests(module: &str) -> String {
    let class = class_name(module);
    format!(
        r#"/**
 * Unit tests: {class}
 */

import {{ {class} }} from '../src/core/{module}';

describe('{class}', () => {{
    let instance: {class};

    beforeEach(() => {{
        instance = new {class}({{ verbose: false, maxResults: 10 }});
    }});

    test('initializes', async () => {{
        await expect(instance.initialize()).resolves.not.toThrow();
    }});

    test('rejects execution before initialization', async () => {{
        await expect(instance.execute('test')).rejects.toThrow('Module not initialized');
    }});

    test('returns results after execution', async () => {{
        await instance.initialize();
        const result = await instance.execute('hello world test');
        expect(result.success).toBe(true);
        expect(result.count).toBeGreaterThan(0);
    }});

    test('honors maxResults', async () => {{
        const limited = new {class}({{ verbose: false, maxResults: 2 }});
        await limited.initialize();
        const result = await limited.execute('a b c d e f g');
        expect(result.count).toBeLessThanOrEqual(2);
    }});
}});
"#,
        class = class,
        module = module,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(description: &str, features: &[&str]) -> ProjectSpecification {
        ProjectSpecification {
            description: description.to_string(),
            tech_stack: "nodejs".to_string(),
            ui_type: "cli".to_string(),
            features: features.iter().map(|f| f.to_string()).collect(),
            confirmed: true,
        }
    }

    fn paths(files: &[GeneratedFile]) -> Vec<&str> {
        files.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn test_module_name_from_description() {
        assert_eq!(module_name(&spec("a file Search tool", &[])), "searcher");
        assert_eq!(module_name(&spec("my TODO list", &[])), "todoManager");
        assert_eq!(module_name(&spec("a calculator", &[])), "core");
    }

    #[test]
    fn test_plan_without_config() {
        let files = plan_files(&spec("a todo list", &[]));
        assert_eq!(
            paths(&files),
            vec![
                "src/index.ts",
                "src/core/todoManager.ts",
                "src/types/index.ts",
                "tests/todoManager.test.ts"
            ]
        );
    }

    #[test]
    fn test_plan_with_config_adds_one_file() {
        let files = plan_files(&spec("a file search tool", &["config", "logging"]));
        assert_eq!(files.len(), 5);
        assert_eq!(files.iter().filter(|f| f.path == "src/config.ts").count(), 1);
        assert_eq!(files[3].path, "src/config.ts");
        assert!(files[0].content.contains("import { Config } from './config';"));
    }

    #[test]
    fn test_planning_is_deterministic() {
        let s = spec("a file search tool", &["config"]);
        assert_eq!(plan_files(&s), plan_files(&s));
    }

    #[test]
    fn test_entry_embeds_spec_and_ui_block() {
        let mut s = spec("a weather service", &[]);
        s.ui_type = "api".to_string();
        let files = plan_files(&s);
        let entry = &files[0].content;
        assert!(entry.contains(" * a weather service"));
        assert!(entry.contains("Tech stack: nodejs"));
        assert!(entry.contains("Headless API mode"));
        assert!(entry.contains("import { Core } from './core/core';"));
    }

    #[test]
    fn test_unknown_ui_falls_back_to_run() {
        assert!(render_ui_startup("desktop").contains("app.run()"));
        assert!(render_ui_startup("cli").contains("readline"));
    }

    #[test]
    fn test_class_name_capitalizes() {
        assert_eq!(class_name("todoManager"), "TodoManager");
        assert_eq!(class_name(""), "");
    }
}
